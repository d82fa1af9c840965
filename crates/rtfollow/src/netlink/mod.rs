//! The rtnetlink protocol layer: message framing, the attribute codec,
//! request builders for the operations this crate performs, and the socket
//! transport underneath them.

pub mod addr;
pub mod attr;
pub mod builder;
pub mod connection;
pub mod dump;
pub mod error;
pub mod link;
pub mod message;
pub mod neigh;
pub mod route;
pub mod socket;
pub mod types;

pub use builder::MessageBuilder;
pub use connection::Connection;
pub use dump::DumpBuffer;
pub use error::{Error, Result};
pub use link::VrfLink;
pub use neigh::LLADDR_BROADCAST;
pub use route::RouteSpec;
pub use socket::{groups, RouteSocket};
