//! Reassembly buffer for multi-part dump replies.

use zerocopy::IntoBytes;

use super::message::{nlmsg_align, MessageIter, NlMsgHdr};

const DEFAULT_CAPACITY: usize = 4096;

/// One contiguous buffer holding every message of a dump, in arrival order.
///
/// Appends grow the buffer by doubling its capacity until the new bytes fit.
#[derive(Debug, Default)]
pub struct DumpBuffer {
    buf: Vec<u8>,
}

impl DumpBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes, doubling the capacity until they fit.
    pub fn append(&mut self, data: &[u8]) {
        let needed = self.buf.len() + data.len();
        if needed > self.buf.capacity() {
            let mut capacity = self.buf.capacity().max(1);
            while capacity < needed {
                capacity *= 2;
            }
            self.buf.reserve_exact(capacity - self.buf.len());
        }
        self.buf.extend_from_slice(data);
    }

    /// Append one message, re-padding it so the buffer stays iterable as a
    /// single message stream.
    pub fn append_message(&mut self, header: &NlMsgHdr, payload: &[u8]) {
        self.append(header.as_bytes());
        self.append(payload);
        let pad = nlmsg_align(self.buf.len()) - self.buf.len();
        self.append(&[0u8; 3][..pad]);
    }

    /// Walk the reassembled messages.
    pub fn messages(&self) -> MessageIter<'_> {
        MessageIter::new(&self.buf)
    }
}
