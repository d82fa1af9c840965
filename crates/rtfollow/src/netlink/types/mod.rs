//! Linux ABI types for the rtnetlink message bodies this crate speaks.

pub mod addr;
pub mod link;
pub mod neigh;
pub mod route;

/// Address families (AF_*).
pub const AF_UNSPEC: u8 = 0;
pub const AF_LOCAL: u8 = 1;
pub const AF_INET: u8 = 2;
pub const AF_INET6: u8 = 10;
