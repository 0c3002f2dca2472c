//! Outbound socket creation (spec §4.2): bind a non-blocking stream socket
//! to a chosen source address, then connect it to the target.
//!
//! `monoio::net::TcpStream::connect` always lets the kernel pick the source
//! address, so the bind-to-interface step is hand-rolled with `socket2`
//! directly, mirroring `monoio`'s own `TcpStream::connect_addr` (submit
//! connect, wait for writability with an empty write, then `take_error` to
//! surface a deferred connect failure) with a bind inserted before connect.

use std::io;
use std::net::SocketAddr;
#[cfg(unix)]
use std::os::unix::io::{AsRawFd, FromRawFd};

use monoio::io::AsyncWriteRent;
use monoio::net::TcpStream;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::error::SocketError;

const EMPTY: [u8; 0] = [];

/// Bind a stream socket to `source` (port 0, kernel-assigned) and connect it
/// to `target`. Returns the connected stream, or the socket-level error the
/// kernel reported once the connect attempt resolved.
pub async fn connect_via(source: SocketAddr, target: SocketAddr) -> Result<TcpStream, SocketError> {
    let domain = if target.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP)).map_err(SocketError::from)?;
    socket.set_reuse_address(true).map_err(SocketError::from)?;
    socket
        .bind(&SockAddr::from(source))
        .map_err(SocketError::from)?;
    socket.set_nonblocking(true).map_err(SocketError::from)?;

    match socket.connect(&SockAddr::from(target)) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
        Err(e) if e.raw_os_error() == Some(libc::EINPROGRESS) => {}
        Err(e) => return Err(SocketError::from(e)),
    }

    let std_stream: std::net::TcpStream = socket.into();
    let mut stream = TcpStream::from_std(std_stream).map_err(SocketError::from)?;

    // Wait for writability the same way `TcpStream::connect_addr` does:
    // an empty write suspends until the fd is writable.
    let (res, _) = stream.write(&EMPTY[..]).await;
    res.map_err(SocketError::from)?;

    // The deferred connect error, if any, only surfaces via SO_ERROR.
    take_error(&stream)?;

    Ok(stream)
}

#[cfg(unix)]
fn take_error(stream: &TcpStream) -> Result<(), SocketError> {
    let fd = stream.as_raw_fd();
    // Borrow the fd through socket2 only for the duration of this call; the
    // wrapper must not close it on drop since `stream` still owns it.
    let borrowed = unsafe { Socket::from_raw_fd(fd) };
    let err = borrowed.take_error();
    std::mem::forget(borrowed);
    match err.map_err(SocketError::from)? {
        Some(e) => Err(SocketError::from(e)),
        None => Ok(()),
    }
}
