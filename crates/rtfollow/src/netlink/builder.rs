//! Request construction.
//!
//! [`MessageBuilder`] grows a byte vector: header first, then the fixed
//! body, then attributes, each padded to the 4-byte rule. Nested attribute
//! groups reserve their header up front and patch its length when closed.
//! The total length, sequence number, and port id are patched into the
//! header at send time.

use zerocopy::{Immutable, IntoBytes};

use super::attr::{nla_align, NlAttr, NLA_F_NESTED};
use super::message::NlMsgHdr;

/// An open nested attribute group; hand it back to
/// [`MessageBuilder::nest_end`] to patch the group's length.
#[must_use]
pub struct NestToken {
    offset: usize,
}

/// Incrementally built netlink request.
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    pub fn new(msg_type: u16, flags: u16) -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(NlMsgHdr::new(msg_type, flags).as_bytes());
        Self { buf }
    }

    fn pad(&mut self) {
        let aligned = nla_align(self.buf.len());
        self.buf.resize(aligned, 0);
    }

    /// Append the fixed body that follows the header.
    pub fn body<T: IntoBytes + Immutable>(&mut self, body: &T) {
        self.buf.extend_from_slice(body.as_bytes());
        self.pad();
    }

    /// Append an attribute with an arbitrary payload.
    pub fn attr(&mut self, code: u16, data: &[u8]) {
        self.buf.extend_from_slice(NlAttr::new(code, data.len()).as_bytes());
        self.buf.extend_from_slice(data);
        self.pad();
    }

    /// Append a native-endian u32 attribute.
    pub fn attr_u32(&mut self, code: u16, value: u32) {
        self.attr(code, &value.to_ne_bytes());
    }

    /// Append a NUL-terminated string attribute.
    pub fn attr_str(&mut self, code: u16, value: &str) {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        self.attr(code, &data);
    }

    /// Open a nested attribute group.
    pub fn nest_start(&mut self, code: u16) -> NestToken {
        let offset = self.buf.len();
        self.buf
            .extend_from_slice(NlAttr::new(code | NLA_F_NESTED, 0).as_bytes());
        NestToken { offset }
    }

    /// Close a nested group, patching its length to cover everything
    /// appended since [`nest_start`](Self::nest_start).
    pub fn nest_end(&mut self, token: NestToken) {
        let total = (self.buf.len() - token.offset) as u16;
        self.buf[token.offset..token.offset + 2].copy_from_slice(&total.to_ne_bytes());
    }

    /// Patch the sequence number into the header.
    pub fn set_seq(&mut self, seq: u32) {
        self.buf[8..12].copy_from_slice(&seq.to_ne_bytes());
    }

    /// Patch the sender port id into the header.
    pub fn set_pid(&mut self, pid: u32) {
        self.buf[12..16].copy_from_slice(&pid.to_ne_bytes());
    }

    /// Patch the total length and return the wire bytes.
    pub fn finish(mut self) -> Vec<u8> {
        let len = self.buf.len() as u32;
        self.buf[0..4].copy_from_slice(&len.to_ne_bytes());
        self.buf
    }
}
