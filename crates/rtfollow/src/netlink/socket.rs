//! Raw rtnetlink socket.
//!
//! netlink-sys provides the socket syscalls; every message on the wire is
//! built and parsed by this crate. The socket is registered with tokio as
//! an [`AsyncFd`], so sends and receives are readiness loops over the
//! non-blocking fd. One socket carries both request/reply traffic and any
//! multicast subscriptions; callers correlate datagrams by sequence number.

use std::fs::File;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::{Context, Poll};

use bytes::BytesMut;
use netlink_sys::{protocols, Socket, SocketAddr};
use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tracing::warn;

use super::error::{Error, Result};

/// rtnetlink multicast groups.
pub mod groups {
    pub const LINK: u32 = 1;
    pub const NEIGH: u32 = 3;
    pub const IPV4_IFADDR: u32 = 5;
    pub const IPV4_ROUTE: u32 = 7;
    pub const IPV6_ROUTE: u32 = 11;
}

/// Receive buffer size; rtnetlink datagrams never exceed this.
const RECV_BUF_SIZE: usize = 32 * 1024;

const SOL_NETLINK: libc::c_int = 270;
const NETLINK_GET_STRICT_CHK: libc::c_int = 12;

/// A bound, non-blocking NETLINK_ROUTE socket.
pub struct RouteSocket {
    fd: AsyncFd<Socket>,
    seq: AtomicU32,
    pid: u32,
}

impl RouteSocket {
    /// Open and bind a socket in the current network namespace.
    pub fn new() -> Result<Self> {
        Self::setup(Socket::new(protocols::NETLINK_ROUTE)?)
    }

    /// Open a socket inside the network namespace mounted at `path`
    /// (`/var/run/netns/<name>` or `/proc/<pid>/ns/net`).
    ///
    /// The calling thread enters the namespace only for the `socket()`
    /// call and switches back afterwards; the socket itself stays bound to
    /// the target namespace.
    pub fn open_in<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let target = File::open(path).map_err(|e| {
            Error::InvalidMessage(format!("cannot open namespace {}: {e}", path.display()))
        })?;
        let current = File::open("/proc/self/ns/net")?;

        // SAFETY: both fds are open network namespace files.
        let rc = unsafe { libc::setns(target.as_raw_fd(), libc::CLONE_NEWNET) };
        if rc < 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }

        let socket = Socket::new(protocols::NETLINK_ROUTE);

        // SAFETY: restores the namespace saved above.
        let rc = unsafe { libc::setns(current.as_raw_fd(), libc::CLONE_NEWNET) };
        if rc < 0 {
            warn!(
                "failed to return to the original namespace: {}",
                std::io::Error::last_os_error()
            );
        }

        Self::setup(socket?)
    }

    fn setup(mut socket: Socket) -> Result<Self> {
        socket.set_non_blocking(true)?;

        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let pid = addr.port_number();

        set_strict_check(socket.as_raw_fd());

        Ok(Self {
            fd: AsyncFd::new(socket)?,
            seq: AtomicU32::new(1),
            pid,
        })
    }

    /// Port id the kernel assigned at bind time.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Next request sequence number.
    pub fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Join a multicast group.
    pub fn add_membership(&mut self, group: u32) -> Result<()> {
        self.fd.get_mut().add_membership(group)?;
        Ok(())
    }

    /// Leave a multicast group.
    pub fn drop_membership(&mut self, group: u32) -> Result<()> {
        self.fd.get_mut().drop_membership(group)?;
        Ok(())
    }

    /// Send one finished request.
    pub async fn send(&self, msg: &[u8]) -> Result<()> {
        loop {
            let mut guard = self.fd.ready(Interest::WRITABLE).await?;
            match guard.try_io(|inner| inner.get_ref().send(msg, 0)) {
                Ok(result) => {
                    result?;
                    return Ok(());
                }
                Err(_would_block) => continue,
            }
        }
    }

    /// Receive one datagram.
    pub async fn recv(&self) -> Result<Vec<u8>> {
        loop {
            let mut guard = self.fd.ready(Interest::READABLE).await?;
            let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);
            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, 0)) {
                Ok(result) => {
                    result?;
                    return Ok(buf.to_vec());
                }
                Err(_would_block) => continue,
            }
        }
    }

    /// Poll-flavoured receive for stream adapters.
    pub fn poll_recv(&self, cx: &mut Context<'_>) -> Poll<Result<Vec<u8>>> {
        loop {
            let mut guard = match self.fd.poll_read_ready(cx) {
                Poll::Ready(Ok(guard)) => guard,
                Poll::Ready(Err(e)) => return Poll::Ready(Err(e.into())),
                Poll::Pending => return Poll::Pending,
            };
            let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);
            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, 0)) {
                Ok(Ok(_)) => return Poll::Ready(Ok(buf.to_vec())),
                Ok(Err(e)) => return Poll::Ready(Err(e.into())),
                Err(_would_block) => continue,
            }
        }
    }
}

/// Ask the kernel to validate request headers strictly and filter dumps
/// server-side. Kernels without the option still serve every request, so a
/// refusal is only logged.
fn set_strict_check(fd: RawFd) {
    let one: libc::c_int = 1;
    // SAFETY: fd is an open socket and the option value outlives the call.
    let rc = unsafe {
        libc::setsockopt(
            fd,
            SOL_NETLINK,
            NETLINK_GET_STRICT_CHK,
            &one as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        warn!(
            "NETLINK_GET_STRICT_CHK not available: {}",
            std::io::Error::last_os_error()
        );
    }
}
