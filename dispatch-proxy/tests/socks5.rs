//! End-to-end scenarios driven against a real listener and real client
//! sockets, in the style of `monoio`'s own `tests/tcp_echo.rs`
//! (`#[monoio::test_all]`, `TcpListener::bind("127.0.0.1:0")`, a spawned
//! peer task talking the wire protocol directly).

use std::cell::RefCell;
use std::rc::Rc;

use monoio::io::{AsyncReadRentExt, AsyncWriteRentExt};
use monoio::net::{TcpListener, TcpStream};

use dispatch_proxy::address::HostAddress;
use dispatch_proxy::balancer::InterfaceManager;
use dispatch_proxy::server;

const NO_AUTH_GREETING: &[u8] = &[0x05, 0x01, 0x00];

fn loopback_manager() -> Rc<RefCell<InterfaceManager>> {
    let mut mgr = InterfaceManager::new();
    mgr.add(HostAddress::V4([127, 0, 0, 1]), 1);
    Rc::new(RefCell::new(mgr))
}

async fn connect_request(client: &mut TcpStream, target: std::net::SocketAddrV4) {
    let (res, _) = client.write_all(NO_AUTH_GREETING).await;
    res.unwrap();
    let (res, reply) = client.read_exact(vec![0u8; 2]).await;
    res.unwrap();
    assert_eq!(reply, vec![0x05, 0x00]);

    let mut req = vec![0x05, 0x01, 0x00, 0x01];
    req.extend_from_slice(&target.ip().octets());
    req.extend_from_slice(&target.port().to_be_bytes());
    let (res, _) = client.write_all(req).await;
    res.unwrap();
}

async fn read_reply(client: &mut TcpStream) -> u8 {
    let (res, header) = client.read_exact(vec![0u8; 4]).await;
    res.unwrap();
    let code = header[1];
    // ATYP is always 1 (IPv4) for replies this system writes; drain BND.
    let (res, _) = client.read_exact(vec![0u8; 6]).await;
    res.unwrap();
    code
}

#[monoio::test_all]
async fn connect_and_echo_round_trip() {
    // A plain echo server plays the role of the CONNECT target.
    let echo = TcpListener::bind("127.0.0.1:0").unwrap();
    let echo_addr = match echo.local_addr().unwrap() {
        std::net::SocketAddr::V4(a) => a,
        _ => unreachable!(),
    };
    monoio::spawn(async move {
        let (mut conn, _) = echo.accept().await.unwrap();
        let (res, buf) = conn.read_exact(vec![0u8; 5]).await;
        res.unwrap();
        let (res, _) = conn.write_all(buf).await;
        res.unwrap();
    });

    let proxy = TcpListener::bind("127.0.0.1:0").unwrap();
    let proxy_addr = proxy.local_addr().unwrap();
    let manager = loopback_manager();
    monoio::spawn(server::serve(proxy, manager, None));

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    connect_request(&mut client, echo_addr).await;
    let code = read_reply(&mut client).await;
    assert_eq!(code, 0x00);

    let (res, _) = client.write_all(b"hello".to_vec()).await;
    res.unwrap();
    let (res, buf) = client.read_exact(vec![0u8; 5]).await;
    res.unwrap();
    assert_eq!(&buf, b"hello");
}

#[monoio::test_all]
async fn unsupported_command_gets_command_not_supported_reply() {
    let proxy = TcpListener::bind("127.0.0.1:0").unwrap();
    let proxy_addr = proxy.local_addr().unwrap();
    let manager = loopback_manager();
    monoio::spawn(server::serve(proxy, manager, None));

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    let (res, _) = client.write_all(NO_AUTH_GREETING.to_vec()).await;
    res.unwrap();
    let (res, _) = client.read_exact(vec![0u8; 2]).await;
    res.unwrap();

    // BIND (0x02) instead of CONNECT, targeting an arbitrary IPv4 address.
    let mut req = vec![0x05, 0x02, 0x00, 0x01];
    req.extend_from_slice(&[10, 0, 0, 1]);
    req.extend_from_slice(&80u16.to_be_bytes());
    let (res, _) = client.write_all(req).await;
    res.unwrap();

    let code = read_reply(&mut client).await;
    assert_eq!(code, 0x07);
}

#[monoio::test_all]
async fn no_matching_family_gets_network_unreachable_reply() {
    // Only an IPv4 interface is configured; an IPv6 target must fail closed.
    let proxy = TcpListener::bind("127.0.0.1:0").unwrap();
    let proxy_addr = proxy.local_addr().unwrap();
    let manager = loopback_manager();
    monoio::spawn(server::serve(proxy, manager, None));

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    let (res, _) = client.write_all(NO_AUTH_GREETING.to_vec()).await;
    res.unwrap();
    let (res, _) = client.read_exact(vec![0u8; 2]).await;
    res.unwrap();

    let mut req = vec![0x05, 0x01, 0x00, 0x04];
    req.extend_from_slice(&[0u8; 15]);
    req.push(1); // ::1
    req.extend_from_slice(&80u16.to_be_bytes());
    let (res, _) = client.write_all(req).await;
    res.unwrap();

    let code = read_reply(&mut client).await;
    assert_eq!(code, 0x03);
}

#[monoio::test_all]
async fn connection_refused_propagates_reply_code() {
    // Bind a listener only to learn a free port, then drop it immediately so
    // the subsequent CONNECT finds nothing listening there.
    let probe = TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_addr = match probe.local_addr().unwrap() {
        std::net::SocketAddr::V4(a) => a,
        _ => unreachable!(),
    };
    drop(probe);

    let proxy = TcpListener::bind("127.0.0.1:0").unwrap();
    let proxy_addr = proxy.local_addr().unwrap();
    let manager = loopback_manager();
    monoio::spawn(server::serve(proxy, manager, None));

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    connect_request(&mut client, dead_addr).await;
    let code = read_reply(&mut client).await;
    assert_eq!(code, 0x05);
}

#[monoio::test_all]
async fn malformed_greeting_closes_silently() {
    let proxy = TcpListener::bind("127.0.0.1:0").unwrap();
    let proxy_addr = proxy.local_addr().unwrap();
    let manager = loopback_manager();
    monoio::spawn(server::serve(proxy, manager, None));

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    // Bad version byte (0x04 instead of 0x05).
    let (res, _) = client.write_all(vec![0x04, 0x01, 0x00]).await;
    res.unwrap();

    let (res, _) = client.read_exact(vec![0u8; 2]).await;
    assert!(res.is_err(), "server must close without replying");
}
