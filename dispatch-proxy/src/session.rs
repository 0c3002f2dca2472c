//! The per-client SOCKS5 session state machine (spec §4.5): greeting,
//! request parsing, outbound connect through a balanced interface, and
//! full-duplex relay until either side closes.
//!
//! Control flow is one `async fn` whose sequential `.await`s realize the
//! state path; `SessionState` is recorded at each phase purely for logging
//! and for the "no backward transition" testable property, mirroring how
//! `monoio`'s own examples (`echo.rs`, `proxy.rs`) drive a connection start
//! to finish as straight-line async code rather than a callback machine.

use std::cell::RefCell;
use std::net::SocketAddr;
use std::rc::Rc;
use std::time::Duration;

use monoio::io::{AsyncReadRentExt, AsyncWriteRentExt, Splitable};
use monoio::net::TcpStream;

use crate::address::{Family, SocketAddress};
use crate::balancer::{InterfaceHandle, InterfaceManager};
use crate::error::{SocketError, SocketErrorKind};
use crate::socket;

/// Observable state of a session. Transitions only move forward along this
/// list (spec §4.5, testable property 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    GreetingRead,
    GreetingWrite,
    RequestRead,
    Connecting,
    Relaying,
    ReplyWriteThenClose,
    Done,
}

impl SessionState {
    fn rank(self) -> u8 {
        match self {
            SessionState::GreetingRead => 0,
            SessionState::GreetingWrite => 1,
            SessionState::RequestRead => 2,
            SessionState::Connecting => 3,
            SessionState::Relaying => 4,
            SessionState::ReplyWriteThenClose => 5,
            SessionState::Done => 6,
        }
    }
}

/// Move `state` to `next`, asserting the path never goes backward.
fn advance(state: &mut SessionState, next: SessionState) {
    debug_assert!(
        next.rank() >= state.rank(),
        "session state moved backward: {:?} -> {:?}",
        state,
        next
    );
    tracing::trace!(from = ?*state, to = ?next, "session state transition");
    *state = next;
}

const SOCKS_VERSION: u8 = 0x05;
const CMD_CONNECT: u8 = 0x01;
const ATYP_V4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_V6: u8 = 0x04;

const REPLY_OK: u8 = 0x00;
const REPLY_GENERAL_FAILURE: u8 = 0x01;
const REPLY_NET_UNREACHABLE: u8 = 0x03;
const REPLY_HOST_UNREACHABLE: u8 = 0x04;
const REPLY_CONNECTION_REFUSED: u8 = 0x05;
const REPLY_TTL_EXPIRED: u8 = 0x06;
const REPLY_COMMAND_NOT_SUPPORTED: u8 = 0x07;

/// Releases its held interface exactly once, even on early return or panic
/// unwinding out of `run_session` (spec §5 resource scoping).
struct InterfaceGuard {
    manager: Rc<RefCell<InterfaceManager>>,
    handle: InterfaceHandle,
}

impl Drop for InterfaceGuard {
    fn drop(&mut self) {
        self.manager.borrow_mut().release(self.handle);
    }
}

/// Drive one accepted connection from greeting through relay to close.
pub async fn run_session(
    mut inbound: TcpStream,
    peer: SocketAddr,
    manager: Rc<RefCell<InterfaceManager>>,
    idle_timeout: Option<Duration>,
) {
    let mut state = SessionState::GreetingRead;
    if let Err(e) = negotiate_greeting(&mut inbound, &mut state).await {
        tracing::debug!(%peer, error = %e, "greeting failed, closing silently");
        return;
    }

    advance(&mut state, SessionState::RequestRead);
    let request = match read_request(&mut inbound).await {
        Ok(r) => r,
        Err(RequestError::UnsupportedCommand) => {
            tracing::warn!(%peer, "unsupported SOCKS command");
            advance(&mut state, SessionState::ReplyWriteThenClose);
            let _ = write_reply(&mut inbound, REPLY_COMMAND_NOT_SUPPORTED, None).await;
            advance(&mut state, SessionState::Done);
            return;
        }
        Err(RequestError::Io(e)) => {
            tracing::debug!(%peer, error = %e, "request read failed, closing silently");
            return;
        }
    };

    let target = match resolve_target(request) {
        Ok(t) => t,
        Err(()) => {
            tracing::warn!(%peer, "name resolution failed");
            advance(&mut state, SessionState::ReplyWriteThenClose);
            let _ = write_reply(&mut inbound, REPLY_HOST_UNREACHABLE, None).await;
            advance(&mut state, SessionState::Done);
            return;
        }
    };

    let family_mask = match target.ip() {
        std::net::IpAddr::V4(_) => Family::Inet.bit(),
        std::net::IpAddr::V6(_) => Family::Inet6.bit(),
    };

    let acquired = manager.borrow_mut().acquire(family_mask);
    let handle = match acquired {
        Some(h) => h,
        None => {
            tracing::warn!(%peer, %target, "no interface available for address family");
            advance(&mut state, SessionState::ReplyWriteThenClose);
            let _ = write_reply(&mut inbound, REPLY_NET_UNREACHABLE, None).await;
            advance(&mut state, SessionState::Done);
            return;
        }
    };
    let guard = InterfaceGuard {
        manager: manager.clone(),
        handle,
    };
    let source: SocketAddr = {
        let mgr = manager.borrow();
        let iface = mgr.get(handle);
        SocketAddress::new(iface.addr, 0).into()
    };

    advance(&mut state, SessionState::Connecting);
    let outbound = match socket::connect_via(source, target).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(%peer, %target, error = %e, "outbound connect failed");
            advance(&mut state, SessionState::ReplyWriteThenClose);
            let _ = write_reply(&mut inbound, reply_code_for(&e), None).await;
            advance(&mut state, SessionState::Done);
            drop(guard);
            return;
        }
    };

    let bound = outbound.local_addr().ok();
    if write_reply(&mut inbound, REPLY_OK, bound).await.is_err() {
        drop(guard);
        return;
    }

    advance(&mut state, SessionState::Relaying);
    tracing::info!(%peer, %target, "relaying");
    relay(inbound, outbound, idle_timeout).await;

    advance(&mut state, SessionState::Done);
    drop(guard);
}

async fn negotiate_greeting(
    stream: &mut TcpStream,
    state: &mut SessionState,
) -> std::io::Result<()> {
    let version = stream.read_u8().await?;
    if version != SOCKS_VERSION {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "bad greeting version",
        ));
    }
    let nmethods = stream.read_u8().await?;
    let (res, _methods) = stream.read_exact(vec![0u8; nmethods as usize]).await;
    res?;

    advance(state, SessionState::GreetingWrite);
    // Always select "no authentication" (0x00), even if the client did not
    // offer it: lenient per spec §9 (strict RFC 1928 would reply 0xFF).
    let (res, _) = stream.write_all(vec![SOCKS_VERSION, 0x00]).await;
    res?;
    Ok(())
}

struct RawRequest {
    atyp: u8,
    addr_bytes: Vec<u8>,
    domain: Option<String>,
    port: u16,
}

enum RequestError {
    UnsupportedCommand,
    Io(std::io::Error),
}

impl From<std::io::Error> for RequestError {
    fn from(e: std::io::Error) -> Self {
        RequestError::Io(e)
    }
}

async fn read_request(stream: &mut TcpStream) -> Result<RawRequest, RequestError> {
    let version = stream.read_u8().await?;
    if version != SOCKS_VERSION {
        return Err(RequestError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "bad request version",
        )));
    }
    let cmd = stream.read_u8().await?;
    let _rsv = stream.read_u8().await?;
    let atyp = stream.read_u8().await?;

    if cmd != CMD_CONNECT {
        // Still need to drain the rest of the request so the connection
        // state is well-defined, though we are about to fail it.
        let _ = drain_address(stream, atyp).await;
        return Err(RequestError::UnsupportedCommand);
    }

    let (addr_bytes, domain) = match atyp {
        ATYP_V4 => {
            let (res, buf) = stream.read_exact(vec![0u8; 4]).await;
            res?;
            (buf, None)
        }
        ATYP_V6 => {
            let (res, buf) = stream.read_exact(vec![0u8; 16]).await;
            res?;
            (buf, None)
        }
        ATYP_DOMAIN => {
            let len = stream.read_u8().await? as usize;
            let (res, buf) = stream.read_exact(vec![0u8; len]).await;
            res?;
            let name = String::from_utf8(buf.clone())
                .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "bad domain"))?;
            (buf, Some(name))
        }
        _ => {
            return Err(RequestError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "unsupported address type",
            )));
        }
    };

    let port = stream.read_u16().await?;

    Ok(RawRequest {
        atyp,
        addr_bytes,
        domain,
        port,
    })
}

async fn drain_address(stream: &mut TcpStream, atyp: u8) -> std::io::Result<()> {
    match atyp {
        ATYP_V4 => {
            stream.read_exact(vec![0u8; 4]).await.0?;
        }
        ATYP_V6 => {
            stream.read_exact(vec![0u8; 16]).await.0?;
        }
        ATYP_DOMAIN => {
            let len = stream.read_u8().await? as usize;
            stream.read_exact(vec![0u8; len]).await.0?;
        }
        _ => {}
    }
    let _port = stream.read_u16().await?;
    Ok(())
}

/// Resolve the parsed request into a concrete `SocketAddr`. Domain names are
/// resolved synchronously (spec §5/§6: a known, accepted blocking-resolver
/// hazard, not engineered around).
fn resolve_target(req: RawRequest) -> Result<SocketAddr, ()> {
    use std::net::{Ipv4Addr, Ipv6Addr, ToSocketAddrs};

    match req.atyp {
        ATYP_V4 => {
            let o: [u8; 4] = req.addr_bytes.try_into().map_err(|_| ())?;
            Ok(SocketAddr::new(Ipv4Addr::from(o).into(), req.port))
        }
        ATYP_V6 => {
            let o: [u8; 16] = req.addr_bytes.try_into().map_err(|_| ())?;
            Ok(SocketAddr::new(Ipv6Addr::from(o).into(), req.port))
        }
        ATYP_DOMAIN => {
            let name = req.domain.ok_or(())?;
            (name.as_str(), req.port)
                .to_socket_addrs()
                .map_err(|_| ())?
                .next()
                .ok_or(())
        }
        _ => Err(()),
    }
}

fn reply_code_for(e: &SocketError) -> u8 {
    match e.kind {
        SocketErrorKind::ConnectionRefused => REPLY_CONNECTION_REFUSED,
        SocketErrorKind::NetUnreachable => REPLY_NET_UNREACHABLE,
        SocketErrorKind::HostUnreachable => REPLY_HOST_UNREACHABLE,
        SocketErrorKind::Timeout => REPLY_TTL_EXPIRED,
        _ => REPLY_GENERAL_FAILURE,
    }
}

/// Write a SOCKS5 reply. `bound` is the outbound local address to report on
/// success; `None` (failure replies, or success with no address available)
/// uses `ATYP=1, BND.ADDR=0.0.0.0, BND.PORT=0` (spec §4.5).
async fn write_reply(
    stream: &mut TcpStream,
    code: u8,
    bound: Option<SocketAddr>,
) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity(22);
    buf.push(SOCKS_VERSION);
    buf.push(code);
    buf.push(0x00); // RSV

    match bound {
        Some(SocketAddr::V4(a)) => {
            buf.push(ATYP_V4);
            buf.extend_from_slice(&a.ip().octets());
            buf.extend_from_slice(&a.port().to_be_bytes());
        }
        Some(SocketAddr::V6(a)) => {
            buf.push(ATYP_V6);
            buf.extend_from_slice(&a.ip().octets());
            buf.extend_from_slice(&a.port().to_be_bytes());
        }
        None => {
            buf.push(ATYP_V4);
            buf.extend_from_slice(&[0, 0, 0, 0]);
            buf.extend_from_slice(&0u16.to_be_bytes());
        }
    }

    let (res, _) = stream.write_all(buf).await;
    res
}

/// Full-duplex relay between the client and the outbound connection. Each
/// direction is an independent 8 KiB copy loop, grounded on `monoio`'s own
/// `examples/proxy.rs::copy_one_direction`; EOF on one side propagates as a
/// half-close (`shutdown`) on the other so a one-sided close does not hang
/// the whole session.
async fn relay(inbound: TcpStream, outbound: TcpStream, idle_timeout: Option<Duration>) {
    let (in_r, in_w) = inbound.into_split();
    let (out_r, out_w) = outbound.into_split();

    let copy = async {
        let _ = monoio::join!(
            copy_direction(in_r, out_w),
            copy_direction(out_r, in_w),
        );
    };

    match idle_timeout {
        Some(dur) => {
            monoio::select! {
                _ = copy => {}
                _ = monoio::time::sleep(dur) => {
                    tracing::debug!("relay idle timeout");
                }
            }
        }
        None => copy.await,
    }
}

async fn copy_direction<R, W>(mut from: R, mut to: W)
where
    R: monoio::io::AsyncReadRent,
    W: monoio::io::AsyncWriteRent,
{
    let mut buf = Vec::with_capacity(8 * 1024);
    loop {
        let (res, b) = from.read(buf).await;
        buf = b;
        let n = match res {
            Ok(n) => n,
            Err(_) => break,
        };
        if n == 0 {
            break;
        }
        buf.truncate(n);
        let (res, b) = to.write_all(buf).await;
        buf = b;
        if res.is_err() {
            break;
        }
        buf.clear();
        buf.reserve(8 * 1024);
    }
    let _ = to.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_code_mapping_matches_spec() {
        let err = |k| SocketError::new(k, std::io::Error::new(std::io::ErrorKind::Other, "x"));
        assert_eq!(
            reply_code_for(&err(SocketErrorKind::ConnectionRefused)),
            REPLY_CONNECTION_REFUSED
        );
        assert_eq!(
            reply_code_for(&err(SocketErrorKind::NetUnreachable)),
            REPLY_NET_UNREACHABLE
        );
        assert_eq!(
            reply_code_for(&err(SocketErrorKind::HostUnreachable)),
            REPLY_HOST_UNREACHABLE
        );
        assert_eq!(
            reply_code_for(&err(SocketErrorKind::Timeout)),
            REPLY_TTL_EXPIRED
        );
        assert_eq!(
            reply_code_for(&err(SocketErrorKind::Generic)),
            REPLY_GENERAL_FAILURE
        );
    }
}
