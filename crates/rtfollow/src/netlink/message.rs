//! Netlink message framing.
//!
//! The fixed 16-byte header, the message-level flags, the rtnetlink message
//! types this crate speaks, and iteration over the messages packed into one
//! received datagram. Replies are correlated with requests through the
//! header's sequence number; the protocol offers no other correlation.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::{Error, Result};

/// Alignment unit for messages inside a datagram.
pub const NLMSG_ALIGNTO: usize = 4;

/// Round `len` up to the message alignment boundary.
pub const fn nlmsg_align(len: usize) -> usize {
    (len + NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

/// Size of the netlink message header.
pub const NLMSG_HDRLEN: usize = std::mem::size_of::<NlMsgHdr>();

/// Control message types shared by every netlink family.
pub const NLMSG_NOOP: u16 = 1;
pub const NLMSG_ERROR: u16 = 2;
pub const NLMSG_DONE: u16 = 3;

/// rtnetlink message types.
pub mod rtm {
    pub const NEWLINK: u16 = 16;
    pub const DELLINK: u16 = 17;
    pub const GETLINK: u16 = 18;
    pub const NEWADDR: u16 = 20;
    pub const NEWROUTE: u16 = 24;
    pub const DELROUTE: u16 = 25;
    pub const GETROUTE: u16 = 26;
    pub const NEWNEIGH: u16 = 28;
    pub const DELNEIGH: u16 = 29;
}

/// Message flags.
pub const NLM_F_REQUEST: u16 = 0x01;
pub const NLM_F_MULTI: u16 = 0x02;
pub const NLM_F_ACK: u16 = 0x04;
pub const NLM_F_ROOT: u16 = 0x100;
pub const NLM_F_MATCH: u16 = 0x200;
pub const NLM_F_DUMP: u16 = NLM_F_ROOT | NLM_F_MATCH;

/// Modifiers for NEW* requests.
pub const NLM_F_REPLACE: u16 = 0x100;
pub const NLM_F_EXCL: u16 = 0x200;
pub const NLM_F_CREATE: u16 = 0x400;

/// The netlink message header (struct nlmsghdr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlMsgHdr {
    /// Total message length, header included.
    pub nlmsg_len: u32,
    /// Message type.
    pub nlmsg_type: u16,
    /// Flags (NLM_F_*).
    pub nlmsg_flags: u16,
    /// Sequence number correlating a reply with its request.
    pub nlmsg_seq: u32,
    /// Sending port id; 0 for the kernel.
    pub nlmsg_pid: u32,
}

impl NlMsgHdr {
    /// Header for a new request; the length covers only the header until
    /// [`MessageBuilder::finish`](super::builder::MessageBuilder::finish)
    /// patches it.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        Self {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: msg_type,
            nlmsg_flags: flags,
            nlmsg_seq: 0,
            nlmsg_pid: 0,
        }
    }

    /// Length of the payload following this header.
    pub fn payload_len(&self) -> usize {
        (self.nlmsg_len as usize).saturating_sub(NLMSG_HDRLEN)
    }

    /// Kernel error (or ACK) message.
    pub fn is_error(&self) -> bool {
        self.nlmsg_type == NLMSG_ERROR
    }

    /// End-of-dump marker.
    pub fn is_done(&self) -> bool {
        self.nlmsg_type == NLMSG_DONE
    }

    /// Part of a multi-part reply. Dumps set this on every part, but only
    /// the DONE marker reliably ends a dump.
    pub fn is_multi(&self) -> bool {
        self.nlmsg_flags & NLM_F_MULTI != 0
    }

    /// Borrow a header from the front of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(header, _)| header)
            .map_err(|_| Error::Truncated {
                expected: NLMSG_HDRLEN,
                actual: data.len(),
            })
    }
}

/// Iterator over the messages packed into one datagram.
///
/// Yields the header and the payload slice between the header and the end
/// of the message. Every length is validated against the remaining buffer
/// before a slice is taken; a length pointing outside the buffer yields one
/// error item and ends the iteration.
pub struct MessageIter<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> MessageIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<(&'a NlMsgHdr, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.data.get(self.offset..)?;
        if rest.len() < NLMSG_HDRLEN {
            return None;
        }

        let header = match NlMsgHdr::from_bytes(rest) {
            Ok(header) => header,
            Err(e) => return Some(Err(e)),
        };

        let msg_len = header.nlmsg_len as usize;
        if msg_len < NLMSG_HDRLEN || msg_len > rest.len() {
            self.offset = self.data.len();
            return Some(Err(Error::InvalidMessage(format!(
                "message length {msg_len} outside remaining buffer of {} bytes",
                rest.len()
            ))));
        }

        let payload = &rest[NLMSG_HDRLEN..msg_len];
        self.offset += nlmsg_align(msg_len);
        Some(Ok((header, payload)))
    }
}

/// Payload of an ERROR message: a negated errno (0 for an ACK) followed by
/// the header of the request that caused it.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
pub struct NlMsgError {
    pub error: i32,
    pub msg: NlMsgHdr,
}

impl NlMsgError {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Borrow an error payload from the front of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(err, _)| err)
            .map_err(|_| Error::Truncated {
                expected: Self::SIZE,
                actual: data.len(),
            })
    }

    /// An error code of zero is the kernel acknowledging success.
    pub fn is_ack(&self) -> bool {
        self.error == 0
    }
}
