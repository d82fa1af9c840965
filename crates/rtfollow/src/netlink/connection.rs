//! Request/reply plumbing over one socket.
//!
//! Replies are matched to requests by sequence number alone; datagrams
//! carrying someone else's sequence number, multicast notifications in
//! particular, are skipped. Every receive loop runs under the connection's
//! deadline, so a reply that never comes surfaces as
//! [`Error::Timeout`](super::error::Error::Timeout) instead of hanging the
//! caller.

use std::future::Future;
use std::path::Path;
use std::task::{Context, Poll};
use std::time::Duration;

use tracing::{debug, trace, warn};
use zerocopy::IntoBytes;

use super::builder::MessageBuilder;
use super::dump::DumpBuffer;
use super::error::{Error, Result};
use super::message::{MessageIter, NlMsgError, NLMSG_HDRLEN};
use super::socket::RouteSocket;

/// Default deadline for one request/reply exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// An rtnetlink conversation: sequence numbering, reply correlation, ACK
/// checking, and dump reassembly.
pub struct Connection {
    socket: RouteSocket,
    timeout: Duration,
}

impl Connection {
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: RouteSocket::new()?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Connection subscribed to the given multicast groups.
    pub fn with_groups(groups: &[u32]) -> Result<Self> {
        let mut conn = Self::new()?;
        for &group in groups {
            conn.subscribe(group)?;
        }
        Ok(conn)
    }

    /// Connection operating inside the network namespace mounted at `path`.
    pub fn in_namespace<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            socket: RouteSocket::open_in(path)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Join a multicast group on the underlying socket.
    pub fn subscribe(&mut self, group: u32) -> Result<()> {
        self.socket.add_membership(group)
    }

    /// Deadline applied to every receive loop.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn socket(&self) -> &RouteSocket {
        &self.socket
    }

    fn prepare(&self, mut builder: MessageBuilder) -> (u32, Vec<u8>) {
        let seq = self.socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(self.socket.pid());
        (seq, builder.finish())
    }

    async fn deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                waited: self.timeout,
            }),
        }
    }

    /// Send a request and wait for its ACK.
    pub async fn request_ack(&self, builder: MessageBuilder) -> Result<()> {
        let (seq, msg) = self.prepare(builder);
        self.socket.send(&msg).await?;
        self.deadline(self.wait_ack(seq)).await
    }

    async fn wait_ack(&self, seq: u32) -> Result<()> {
        loop {
            let data = self.socket.recv().await?;
            for item in MessageIter::new(&data) {
                let (header, payload) = item?;
                if header.nlmsg_seq != seq {
                    trace!(seq = header.nlmsg_seq, "skipping unrelated message");
                    continue;
                }
                if header.is_error() {
                    let reply = NlMsgError::from_bytes(payload)?;
                    if reply.is_ack() {
                        return Ok(());
                    }
                    return Err(Error::from_errno(reply.error));
                }
            }
        }
    }

    /// Send a request and return the first reply message, header included.
    pub async fn request(&self, builder: MessageBuilder) -> Result<Vec<u8>> {
        let (seq, msg) = self.prepare(builder);
        self.socket.send(&msg).await?;
        self.deadline(self.wait_reply(seq)).await
    }

    async fn wait_reply(&self, seq: u32) -> Result<Vec<u8>> {
        loop {
            let data = self.socket.recv().await?;
            for item in MessageIter::new(&data) {
                let (header, payload) = item?;
                if header.nlmsg_seq != seq {
                    continue;
                }
                if header.is_error() {
                    let reply = NlMsgError::from_bytes(payload)?;
                    if reply.is_ack() {
                        continue;
                    }
                    return Err(Error::from_errno(reply.error));
                }
                let mut msg = Vec::with_capacity(NLMSG_HDRLEN + payload.len());
                msg.extend_from_slice(header.as_bytes());
                msg.extend_from_slice(payload);
                return Ok(msg);
            }
        }
    }

    /// Send a dump request and reassemble the multi-part reply.
    ///
    /// Reassembly ends at the DONE marker; the multipart flag on the parts
    /// is not trusted. A kernel error reply yields an empty buffer, same as
    /// a table with nothing in it.
    pub async fn dump(&self, builder: MessageBuilder) -> Result<DumpBuffer> {
        let (seq, msg) = self.prepare(builder);
        self.socket.send(&msg).await?;
        self.deadline(self.reassemble(seq)).await
    }

    async fn reassemble(&self, seq: u32) -> Result<DumpBuffer> {
        let mut buffer = DumpBuffer::new();
        loop {
            let data = self.socket.recv().await?;
            for item in MessageIter::new(&data) {
                let (header, payload) = item?;
                if header.nlmsg_seq != seq {
                    continue;
                }
                if header.is_done() {
                    debug!(bytes = buffer.len(), "dump complete");
                    return Ok(buffer);
                }
                if header.is_error() {
                    let reply = NlMsgError::from_bytes(payload)?;
                    if !reply.is_ack() {
                        warn!(errno = -reply.error, "kernel rejected dump");
                    }
                    return Ok(DumpBuffer::new());
                }
                buffer.append_message(header, payload);
            }
        }
    }

    /// Receive one datagram of multicast traffic. No deadline is applied;
    /// callers wrap this with their own.
    pub async fn recv_event(&self) -> Result<Vec<u8>> {
        self.socket.recv().await
    }

    pub(crate) fn poll_recv_event(&self, cx: &mut Context<'_>) -> Poll<Result<Vec<u8>>> {
        self.socket.poll_recv(cx)
    }
}
