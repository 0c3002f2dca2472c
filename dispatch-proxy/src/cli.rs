//! Command-line argument parsing (spec §6): `dispatch-proxy [--bind=addr]...
//! iface1@metric1 iface2@metric2 ...`.
//!
//! Shaped after the reference `dispatch-proxy` CLI (`clap` derive, one
//! repeatable `--bind`, positional `iface@ratio` arguments), trimmed to the
//! CONNECT-only SOCKS5 dispatch this system implements (no tunnel mode, no
//! auto-detection, no interface listing).

use clap::{error::ErrorKind, Parser};

use crate::address::{socket_from_str, SocketAddress};
use crate::error::DispatchError;

const DEFAULT_BIND_V4: &str = "127.0.0.1:1080";
const DEFAULT_BIND_V6: &str = "[::1]:1080";

#[derive(Parser, Debug)]
#[command(
    name = "dispatch-proxy",
    about = "A SOCKS5 proxy that dispatches outbound connections across multiple source interfaces"
)]
struct RawArgs {
    /// Local address to listen for SOCKS5 connections on (repeatable).
    /// Defaults to 127.0.0.1:1080 and [::1]:1080 when omitted.
    #[arg(long = "bind")]
    bind: Vec<String>,

    /// Idle timeout, in seconds, applied to the relay phase of a session.
    /// No timeout by default.
    #[arg(long = "idle-timeout")]
    idle_timeout: Option<u64>,

    /// Suppress informational logging.
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Raise log verbosity.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Outgoing interfaces: <host-address>@<metric>, e.g. 10.0.0.1@1 or
    /// [fe80::1]@2.
    addresses: Vec<String>,
}

/// One `<host-address>@<metric>` argument, parsed.
pub struct InterfaceArg {
    pub addr: crate::address::HostAddress,
    pub metric: u32,
}

pub struct Config {
    pub bind: Vec<SocketAddress>,
    pub idle_timeout: Option<std::time::Duration>,
    pub quiet: bool,
    pub verbose: bool,
    pub interfaces: Vec<InterfaceArg>,
}

/// Parse `argv`. `-h`/`--help` exits 1 rather than clap's usual 0 (spec §6:
/// "-h | --help prints usage and exits 1"), so it is intercepted here instead
/// of left to clap's own process::exit.
pub fn parse(argv: impl IntoIterator<Item = String>) -> Result<Config, DispatchError> {
    let argv: Vec<String> = argv.into_iter().collect();

    let raw = match RawArgs::try_parse_from(&argv) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            print!("{e}");
            std::process::exit(1);
        }
        Err(e) => return Err(DispatchError::new(e.to_string())),
    };

    if raw.addresses.is_empty() {
        return Err(DispatchError::new("No addresses to dispatch."));
    }

    let mut interfaces = Vec::with_capacity(raw.addresses.len());
    for arg in &raw.addresses {
        interfaces.push(parse_interface_arg(arg)?);
    }

    let bind = if raw.bind.is_empty() {
        vec![
            socket_from_str(DEFAULT_BIND_V4).expect("default bind is well-formed"),
            socket_from_str(DEFAULT_BIND_V6).expect("default bind is well-formed"),
        ]
    } else {
        raw.bind
            .iter()
            .map(|s| socket_from_str(s).map_err(|e| DispatchError::new(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(Config {
        bind,
        idle_timeout: raw.idle_timeout.map(std::time::Duration::from_secs),
        quiet: raw.quiet,
        verbose: raw.verbose,
        interfaces,
    })
}

fn parse_interface_arg(arg: &str) -> Result<InterfaceArg, DispatchError> {
    let (host_part, metric_part) = arg
        .rsplit_once('@')
        .ok_or_else(|| DispatchError::new(format!("invalid interface argument: {arg}")))?;

    let addr = crate::address::host_from_str(host_part)
        .map_err(|_| DispatchError::new(format!("invalid interface address: {host_part}")))?;

    let metric: u32 = metric_part
        .parse()
        .map_err(|_| DispatchError::new(format!("invalid metric for {host_part}: {metric_part}")))?;
    if metric == 0 {
        return Err(DispatchError::new(format!(
            "metric for {host_part} must be positive"
        )));
    }

    Ok(InterfaceArg { addr, metric })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("dispatch-proxy".to_string())
            .chain(v.iter().map(|s| s.to_string()))
            .collect()
    }

    #[test]
    fn rejects_zero_addresses() {
        let err = parse(args(&[])).unwrap_err();
        assert_eq!(err.0, "No addresses to dispatch.");
    }

    #[test]
    fn parses_interfaces_and_defaults_bind() {
        let cfg = parse(args(&["127.0.0.1@1", "[::1]@2"])).unwrap();
        assert_eq!(cfg.interfaces.len(), 2);
        assert_eq!(cfg.interfaces[0].metric, 1);
        assert_eq!(cfg.interfaces[1].metric, 2);
        assert_eq!(cfg.bind.len(), 2);
    }

    #[test]
    fn rejects_zero_metric() {
        assert!(parse(args(&["127.0.0.1@0"])).is_err());
    }

    #[test]
    fn honors_explicit_bind() {
        let cfg = parse(args(&["--bind", "127.0.0.1:9050", "127.0.0.1@1"])).unwrap();
        assert_eq!(cfg.bind.len(), 1);
    }
}
