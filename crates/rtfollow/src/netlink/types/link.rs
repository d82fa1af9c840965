//! Link message body (struct ifinfomsg) and link attribute codes.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::error::{Error, Result};

/// Fixed body of RTM_NEWLINK, RTM_DELLINK, and RTM_GETLINK messages.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfInfoMsg {
    pub ifi_family: u8,
    pub ifi_pad: u8,
    pub ifi_type: u16,
    pub ifi_index: i32,
    /// Device flags (IFF_*).
    pub ifi_flags: u32,
    /// Mask selecting which bits of `ifi_flags` the request changes.
    pub ifi_change: u32,
}

impl IfInfoMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_family(mut self, family: u8) -> Self {
        self.ifi_family = family;
        self
    }

    pub fn with_index(mut self, index: i32) -> Self {
        self.ifi_index = index;
        self
    }

    /// Borrow the body from the front of a message payload, returning the
    /// attribute bytes that follow it.
    pub fn from_bytes(data: &[u8]) -> Result<(&Self, &[u8])> {
        Self::ref_from_prefix(data).map_err(|_| Error::Truncated {
            expected: Self::SIZE,
            actual: data.len(),
        })
    }
}

/// Link attribute codes (IFLA_*).
pub mod ifla {
    pub const IFNAME: u16 = 3;
    pub const MASTER: u16 = 10;
    pub const LINKINFO: u16 = 18;
}

/// Codes inside an IFLA_LINKINFO nest (IFLA_INFO_*).
pub mod ifla_info {
    pub const KIND: u16 = 1;
    pub const DATA: u16 = 2;
}

/// Codes inside an IFLA_INFO_DATA nest for vrf devices (IFLA_VRF_*).
pub mod ifla_vrf {
    pub const TABLE: u16 = 1;
}

/// Device flags (IFF_*).
pub mod iff {
    pub const UP: u32 = 0x1;
    pub const RUNNING: u32 = 0x40;
    pub const NOARP: u32 = 0x80;
    pub const MASTER: u32 = 0x400;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_sixteen_bytes() {
        assert_eq!(IfInfoMsg::SIZE, 16);
    }

    #[test]
    fn parse_round_trip() {
        let msg = IfInfoMsg::new().with_family(0).with_index(7);
        let (parsed, rest) = IfInfoMsg::from_bytes(msg.as_bytes()).unwrap();
        assert_eq!(parsed.ifi_index, 7);
        assert!(rest.is_empty());
    }
}
