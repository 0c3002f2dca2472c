//! Listener/server (spec §4.4): bind local sockets, accept inbound
//! connections, hand each accepted socket to a new session.

use std::net::SocketAddr;
use std::rc::Rc;
use std::cell::RefCell;

use monoio::net::TcpListener;

use crate::address::SocketAddress;
use crate::balancer::InterfaceManager;
use crate::error::DispatchError;
use crate::session;

/// Bind one `TcpListener` per configured address. A bind/listen failure at
/// startup is fatal (spec §4.4/§7 tier 1).
pub fn bind_all(addrs: &[SocketAddress]) -> Result<Vec<TcpListener>, DispatchError> {
    let mut listeners = Vec::with_capacity(addrs.len());
    for addr in addrs {
        let std_addr: SocketAddr = (*addr).into();
        let listener = TcpListener::bind(std_addr)
            .map_err(|e| DispatchError::new(format!("bind {addr} failed: {e}")))?;
        tracing::info!(address = %addr, "listening");
        listeners.push(listener);
    }
    Ok(listeners)
}

/// Run one listener's accept loop for the process lifetime. Accept errors
/// are logged and do not tear the listener down (spec §4.4).
pub async fn serve(listener: TcpListener, manager: Rc<RefCell<InterfaceManager>>, idle_timeout: Option<std::time::Duration>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::debug!(%peer, "accepted connection");
                let manager = manager.clone();
                monoio::spawn(async move {
                    session::run_session(stream, peer, manager, idle_timeout).await;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
            }
        }
    }
}
