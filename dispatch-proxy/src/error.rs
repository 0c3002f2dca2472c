//! Closed error taxonomy for socket-level operations (spec §4.2), plus the
//! fatal error type used at startup.

use std::fmt;
use std::io;

/// Socket-level error kinds, a closed set that every OS error is mapped
/// into. `Session` maps these to SOCKS5 reply codes (§4.5/§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketErrorKind {
    Again,
    InvalidHandle,
    InvalidAddress,
    InProgress,
    AlreadyConnected,
    Timeout,
    NetUnreachable,
    HostUnreachable,
    ConnectionRefused,
    Unsupported,
    Generic,
}

#[derive(Debug)]
pub struct SocketError {
    pub kind: SocketErrorKind,
    source: io::Error,
}

impl SocketError {
    pub fn new(kind: SocketErrorKind, source: io::Error) -> Self {
        Self { kind, source }
    }
}

impl fmt::Display for SocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.source)
    }
}

impl std::error::Error for SocketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Map an `io::Error` returned by a socket syscall into the closed kind set.
/// On Unix this inspects `raw_os_error()` for the finer-grained kinds that
/// `io::ErrorKind` does not distinguish (net vs. host unreachable).
impl From<io::Error> for SocketError {
    fn from(e: io::Error) -> Self {
        let kind = classify(&e);
        SocketError::new(kind, e)
    }
}

#[cfg(unix)]
fn classify(e: &io::Error) -> SocketErrorKind {
    match e.raw_os_error() {
        Some(libc::EAGAIN) | Some(libc::EWOULDBLOCK) => return SocketErrorKind::Again,
        Some(libc::EINPROGRESS) => return SocketErrorKind::InProgress,
        Some(libc::EALREADY) | Some(libc::EISCONN) => return SocketErrorKind::AlreadyConnected,
        Some(libc::ETIMEDOUT) => return SocketErrorKind::Timeout,
        Some(libc::ENETUNREACH) | Some(libc::ENETDOWN) => return SocketErrorKind::NetUnreachable,
        Some(libc::EHOSTUNREACH) | Some(libc::EHOSTDOWN) => {
            return SocketErrorKind::HostUnreachable
        }
        Some(libc::ECONNREFUSED) => return SocketErrorKind::ConnectionRefused,
        Some(libc::EBADF) => return SocketErrorKind::InvalidHandle,
        Some(libc::EAFNOSUPPORT) | Some(libc::EPROTONOSUPPORT) => {
            return SocketErrorKind::Unsupported
        }
        Some(libc::EINVAL) => return SocketErrorKind::InvalidAddress,
        _ => {}
    }
    match e.kind() {
        io::ErrorKind::WouldBlock => SocketErrorKind::Again,
        io::ErrorKind::TimedOut => SocketErrorKind::Timeout,
        io::ErrorKind::ConnectionRefused => SocketErrorKind::ConnectionRefused,
        io::ErrorKind::AddrNotAvailable | io::ErrorKind::InvalidInput => {
            SocketErrorKind::InvalidAddress
        }
        io::ErrorKind::Unsupported => SocketErrorKind::Unsupported,
        _ => SocketErrorKind::Generic,
    }
}

#[cfg(not(unix))]
fn classify(e: &io::Error) -> SocketErrorKind {
    match e.kind() {
        io::ErrorKind::WouldBlock => SocketErrorKind::Again,
        io::ErrorKind::TimedOut => SocketErrorKind::Timeout,
        io::ErrorKind::ConnectionRefused => SocketErrorKind::ConnectionRefused,
        io::ErrorKind::AddrNotAvailable | io::ErrorKind::InvalidInput => {
            SocketErrorKind::InvalidAddress
        }
        io::ErrorKind::Unsupported => SocketErrorKind::Unsupported,
        _ => SocketErrorKind::Generic,
    }
}

/// Fatal, startup-time failures (spec §7 tier 1): bad CLI arguments, no
/// interfaces configured, bind/listen failure. `main` surfaces these via
/// `anyhow` and exits non-zero.
#[derive(Debug)]
pub struct DispatchError(pub String);

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DispatchError {}

impl DispatchError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
