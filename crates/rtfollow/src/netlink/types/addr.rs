//! Address message body (struct ifaddrmsg) and address attribute codes.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Fixed body of RTM_NEWADDR messages.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfAddrMsg {
    pub ifa_family: u8,
    pub ifa_prefixlen: u8,
    pub ifa_flags: u8,
    pub ifa_scope: u8,
    pub ifa_index: u32,
}

impl IfAddrMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_family(mut self, family: u8) -> Self {
        self.ifa_family = family;
        self
    }

    pub fn with_prefixlen(mut self, prefixlen: u8) -> Self {
        self.ifa_prefixlen = prefixlen;
        self
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.ifa_flags = flags;
        self
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.ifa_index = index;
        self
    }
}

/// Address attribute codes (IFA_*).
pub mod ifa {
    pub const ADDRESS: u16 = 1;
    pub const LOCAL: u16 = 2;
}

/// Address flags (IFA_F_*).
pub mod ifa_flags {
    pub const SECONDARY: u8 = 0x01;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_eight_bytes() {
        assert_eq!(IfAddrMsg::SIZE, 8);
    }
}
