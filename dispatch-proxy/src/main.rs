//! Entry point: parse arguments, build the interface table, bind listeners,
//! and drive accept loops to completion on monoio's single-threaded runtime.
//!
//! Shaped after `monoio`'s own `examples/echo.rs`/`accept.rs`
//! (`#[monoio::main]`, one `monoio::spawn` per accepted connection) with the
//! CLI/logging ambient stack grounded on the reference `dispatch-proxy`
//! binary (`clap` + `anyhow` + `tracing-subscriber`).

use std::cell::RefCell;
use std::rc::Rc;

use dispatch_proxy::balancer::InterfaceManager;
use dispatch_proxy::{cli, server};

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        tracing::Level::WARN
    } else if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

#[monoio::main(timer_enabled = true)]
async fn main() -> anyhow::Result<()> {
    let config = match cli::parse(std::env::args()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("dispatch-proxy: {e}");
            std::process::exit(1);
        }
    };

    init_logging(config.quiet, config.verbose);

    let mut manager = InterfaceManager::new();
    for iface in &config.interfaces {
        manager.add(iface.addr, iface.metric);
        tracing::info!(addr = %iface.addr, metric = iface.metric, "configured outgoing interface");
    }
    let manager = Rc::new(RefCell::new(manager));

    let listeners =
        server::bind_all(&config.bind).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let mut tasks = Vec::with_capacity(listeners.len());
    for listener in listeners {
        let manager = manager.clone();
        let idle_timeout = config.idle_timeout;
        tasks.push(monoio::spawn(async move {
            server::serve(listener, manager, idle_timeout).await;
        }));
    }

    for task in tasks {
        let _ = task.await;
    }

    Ok(())
}
