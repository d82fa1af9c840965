//! Route message body (struct rtmsg) and route attribute codes.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::error::{Error, Result};

/// Fixed body of RTM_NEWROUTE, RTM_DELROUTE, and RTM_GETROUTE messages.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RtMsg {
    pub rtm_family: u8,
    pub rtm_dst_len: u8,
    pub rtm_src_len: u8,
    pub rtm_tos: u8,
    /// Table id, when it fits in a byte; larger ids travel as an attribute.
    pub rtm_table: u8,
    pub rtm_protocol: u8,
    pub rtm_scope: u8,
    pub rtm_type: u8,
    pub rtm_flags: u32,
}

impl RtMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_family(mut self, family: u8) -> Self {
        self.rtm_family = family;
        self
    }

    pub fn with_dst_len(mut self, dst_len: u8) -> Self {
        self.rtm_dst_len = dst_len;
        self
    }

    pub fn with_table(mut self, table: u8) -> Self {
        self.rtm_table = table;
        self
    }

    pub fn with_protocol(mut self, protocol: u8) -> Self {
        self.rtm_protocol = protocol;
        self
    }

    pub fn with_scope(mut self, scope: u8) -> Self {
        self.rtm_scope = scope;
        self
    }

    pub fn with_type(mut self, rtm_type: u8) -> Self {
        self.rtm_type = rtm_type;
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

/// Route attribute codes (RTA_*).
pub mod rta {
    pub const DST: u16 = 1;
    pub const OIF: u16 = 4;
    pub const GATEWAY: u16 = 5;
    pub const PRIORITY: u16 = 6;
    pub const METRICS: u16 = 8;
    pub const TABLE: u16 = 15;
}

/// Route scopes (RT_SCOPE_*).
pub mod scope {
    pub const UNIVERSE: u8 = 0;
    pub const LINK: u8 = 253;
    pub const HOST: u8 = 254;
}

/// Reserved table ids (RT_TABLE_*).
pub mod rt_table {
    pub const UNSPEC: u8 = 0;
    pub const MAIN: u8 = 254;
}

/// Route origin protocols (RTPROT_*).
pub mod rtprot {
    pub const UNSPEC: u8 = 0;
    pub const KERNEL: u8 = 2;
    pub const BOOT: u8 = 3;
    pub const STATIC: u8 = 4;
}

/// Route types (RTN_*).
pub mod rtn {
    pub const UNSPEC: u8 = 0;
    pub const UNICAST: u8 = 1;
}
