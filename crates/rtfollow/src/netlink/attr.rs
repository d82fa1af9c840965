//! TLV attribute encoding and decoding.
//!
//! Attributes follow the fixed body of a message as a chain of
//! (length, type, payload) triples, each padded out to a 4-byte boundary.
//! Walks are bounds-checked against the enclosing buffer: a length that is
//! short or runs past the end terminates the walk instead of reading
//! beyond it.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Alignment unit for attributes.
pub const NLA_ALIGNTO: usize = 4;

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = std::mem::size_of::<NlAttr>();

/// The low bits of `nla_type` carry the attribute code; the top two bits
/// flag nesting and byte order.
pub const NLA_TYPE_MASK: u16 = 0x3fff;
pub const NLA_F_NESTED: u16 = 0x8000;

/// Round `len` up to the attribute alignment boundary.
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Attribute header (struct nlattr): total length including this header,
/// then the type.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    pub nla_len: u16,
    pub nla_type: u16,
}

impl NlAttr {
    pub fn new(code: u16, payload_len: usize) -> Self {
        Self {
            nla_len: (NLA_HDRLEN + payload_len) as u16,
            nla_type: code,
        }
    }

    /// Attribute code with the flag bits masked off.
    pub fn code(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Length of the payload following this header.
    pub fn payload_len(&self) -> usize {
        (self.nla_len as usize).saturating_sub(NLA_HDRLEN)
    }
}

/// Bounds-checked walk over an attribute chain, yielding each attribute's
/// code and payload slice.
pub struct AttrIter<'a> {
    data: &'a [u8],
}

impl<'a> AttrIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Payload of the first attribute carrying `code`.
    pub fn find(self, code: u16) -> Option<&'a [u8]> {
        for (kind, payload) in self {
            if kind == code {
                return Some(payload);
            }
        }
        None
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = (u16, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < NLA_HDRLEN {
            return None;
        }

        let (header, _) = NlAttr::ref_from_prefix(self.data).ok()?;
        let total = header.nla_len as usize;
        if total < NLA_HDRLEN || total > self.data.len() {
            return None;
        }

        let code = header.code();
        let payload = &self.data[NLA_HDRLEN..total];
        self.data = self.data.get(nla_align(total)..).unwrap_or(&[]);
        Some((code, payload))
    }
}

/// Readers for attribute payloads. Each checks the payload is at least as
/// long as the value it extracts.
pub mod payload {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use crate::netlink::error::{Error, Result};
    use crate::netlink::types::{AF_INET, AF_INET6};

    /// Native-endian u32, the encoding of most scalar attributes.
    pub fn u32_ne(data: &[u8]) -> Result<u32> {
        match data.first_chunk::<4>() {
            Some(bytes) => Ok(u32::from_ne_bytes(*bytes)),
            None => Err(Error::InvalidAttribute(format!(
                "expected 4 bytes, got {}",
                data.len()
            ))),
        }
    }

    /// NUL-terminated string; the terminator may be absent.
    pub fn string(data: &[u8]) -> Result<String> {
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..end])
            .map(str::to_owned)
            .map_err(|_| Error::InvalidAttribute("string payload is not UTF-8".to_owned()))
    }

    /// Address bytes interpreted according to the message's family.
    pub fn ip(data: &[u8], family: u8) -> Result<IpAddr> {
        let addr = match family {
            AF_INET => data.first_chunk::<4>().map(|octets| IpAddr::V4(Ipv4Addr::from(*octets))),
            AF_INET6 => data.first_chunk::<16>().map(|octets| IpAddr::V6(Ipv6Addr::from(*octets))),
            _ => None,
        };
        addr.ok_or_else(|| {
            Error::InvalidAttribute(format!(
                "cannot read an address for family {family} from {} bytes",
                data.len()
            ))
        })
    }
}
