//! Error types.

use std::net::Ipv4Addr;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong talking to the kernel or reconciling
/// table state. Kernel-reported failures keep their errno; local failures
/// never alias one.
#[derive(Debug, Error)]
pub enum Error {
    /// Socket-level failure, before any kernel verdict.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the kernel in an ERROR message.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel { errno: i32, message: String },

    /// Buffer too short for the structure parsed from it.
    #[error("truncated message: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Reply that does not follow the protocol.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Attribute payload that cannot carry the value asked of it.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// A receive loop exhausted its deadline.
    #[error("timed out after {waited:?}")]
    Timeout { waited: Duration },

    /// Name lookup found no such interface.
    #[error("interface not found: {name}")]
    InterfaceNotFound { name: String },

    /// Prefix length outside the routable range.
    #[error("prefix length {prefix_len} must be between 1 and 31")]
    PrefixLength { prefix_len: u8 },

    /// Destination with bits set below its prefix.
    #[error("destination {destination}/{prefix_len} has host bits set")]
    HostBits {
        destination: Ipv4Addr,
        prefix_len: u8,
    },

    /// Operation that needs an interface index got none.
    #[error("interface index must be nonzero")]
    IfindexRequired,

    /// Operation against a table nobody asked to follow.
    #[error("routing table {table} is not followed")]
    NotFollowed { table: u32 },

    /// Announce of a route the table already holds.
    #[error("route already present in table {table}")]
    RouteExists { table: u32 },

    /// Withdrawal of a route the table does not hold.
    #[error("route not present in table {table}")]
    RouteMissing { table: u32 },
}

impl Error {
    /// Convert the code carried by an ERROR message (a negated errno, or 0
    /// for an ACK) into an error. The stored errno is positive.
    pub fn from_errno(code: i32) -> Self {
        let errno = -code;
        Self::Kernel {
            errno,
            message: std::io::Error::from_raw_os_error(errno).to_string(),
        }
    }

    /// The kernel errno behind this error, if there is one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    /// The requested object does not exist (ENOENT or ENODEV).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::InterfaceNotFound { .. } => true,
            _ => matches!(self.errno(), Some(e) if e == libc::ENOENT || e == libc::ENODEV),
        }
    }

    /// The object already exists (EEXIST).
    pub fn is_already_exists(&self) -> bool {
        self.errno() == Some(libc::EEXIST)
    }

    /// A receive deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
