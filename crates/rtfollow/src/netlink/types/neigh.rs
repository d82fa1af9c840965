//! Neighbor message body (struct ndmsg) and neighbor attribute codes.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Fixed body of RTM_NEWNEIGH and RTM_DELNEIGH messages.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NdMsg {
    pub ndm_family: u8,
    pub ndm_pad1: u8,
    pub ndm_pad2: u16,
    pub ndm_ifindex: i32,
    /// Entry state (NUD_*).
    pub ndm_state: u16,
    /// Entry flags (NTF_*).
    pub ndm_flags: u8,
    pub ndm_type: u8,
}

impl NdMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_family(mut self, family: u8) -> Self {
        self.ndm_family = family;
        self
    }

    pub fn with_ifindex(mut self, ifindex: i32) -> Self {
        self.ndm_ifindex = ifindex;
        self
    }

    pub fn with_state(mut self, state: u16) -> Self {
        self.ndm_state = state;
        self
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.ndm_flags = flags;
        self
    }

    pub fn with_type(mut self, ndm_type: u8) -> Self {
        self.ndm_type = ndm_type;
        self
    }
}

/// Neighbor attribute codes (NDA_*).
pub mod nda {
    pub const DST: u16 = 1;
    pub const LLADDR: u16 = 2;
    pub const CACHEINFO: u16 = 3;
    pub const PROBES: u16 = 4;
}

/// Neighbor entry states (NUD_*).
pub mod nud {
    pub const STALE: u16 = 0x04;
    pub const PROBE: u16 = 0x10;
    pub const PERMANENT: u16 = 0x80;
}

/// Neighbor entry flags (NTF_*).
pub mod ntf {
    pub const SELF: u8 = 0x02;
}

/// Cache metadata attached to a new entry (struct nda_cacheinfo).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, IntoBytes, Immutable)]
pub struct NdCacheInfo {
    pub ndm_confirmed: u32,
    pub ndm_used: u32,
    pub ndm_updated: u32,
    pub ndm_refcnt: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_twelve_bytes() {
        assert_eq!(NdMsg::SIZE, 12);
    }

    #[test]
    fn cacheinfo_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<NdCacheInfo>(), 16);
    }
}
