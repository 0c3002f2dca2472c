//! Host and socket address value types.
//!
//! These are hand-written rather than newtypes over `std::net::IpAddr` /
//! `SocketAddr` because the text format this proxy's CLI and SOCKS5 layer
//! need differs from `std`'s: IPv6 zero-run compression here elides runs of
//! length >= 1 (not >= 2), tie-broken by earliest position.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

/// A host address: either IPv4 or IPv6, stored in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostAddress {
    V4([u8; 4]),
    V6([u8; 16]),
}

/// Address family bit used by the interface balancer's family mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Inet,
    Inet6,
}

impl Family {
    pub const INET_BIT: u8 = 0b01;
    pub const INET6_BIT: u8 = 0b10;

    pub fn bit(self) -> u8 {
        match self {
            Family::Inet => Self::INET_BIT,
            Family::Inet6 => Self::INET6_BIT,
        }
    }
}

/// A parse failure, carrying the offending input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid address: {:?}", self.0)
    }
}

impl std::error::Error for ParseError {}

impl HostAddress {
    pub fn family(&self) -> Family {
        match self {
            HostAddress::V4(_) => Family::Inet,
            HostAddress::V6(_) => Family::Inet6,
        }
    }

    pub fn is_v6(&self) -> bool {
        matches!(self, HostAddress::V6(_))
    }
}

impl From<Ipv4Addr> for HostAddress {
    fn from(a: Ipv4Addr) -> Self {
        HostAddress::V4(a.octets())
    }
}

impl From<Ipv6Addr> for HostAddress {
    fn from(a: Ipv6Addr) -> Self {
        HostAddress::V6(a.octets())
    }
}

impl From<std::net::IpAddr> for HostAddress {
    fn from(a: std::net::IpAddr) -> Self {
        match a {
            std::net::IpAddr::V4(v4) => v4.into(),
            std::net::IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl From<HostAddress> for std::net::IpAddr {
    fn from(h: HostAddress) -> Self {
        match h {
            HostAddress::V4(o) => std::net::IpAddr::V4(Ipv4Addr::from(o)),
            HostAddress::V6(o) => std::net::IpAddr::V6(Ipv6Addr::from(o)),
        }
    }
}

/// Parse a host address: `d.d.d.d` or `[h:h:...:h]`. Leading whitespace is
/// skipped; anything else is a `ParseError`.
pub fn host_from_str(s: &str) -> Result<HostAddress, ParseError> {
    let trimmed = s.trim_start();
    if let Some(inner) = trimmed.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| ParseError(s.to_string()))?;
        parse_ipv6(inner)
            .map(HostAddress::V6)
            .ok_or_else(|| ParseError(s.to_string()))
    } else {
        parse_ipv4(trimmed)
            .map(HostAddress::V4)
            .ok_or_else(|| ParseError(s.to_string()))
    }
}

fn parse_ipv4(s: &str) -> Option<[u8; 4]> {
    let mut out = [0u8; 4];
    let mut parts = s.split('.');
    for slot in out.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || (part.len() > 1 && part.starts_with('0')) {
            return None;
        }
        *slot = part.parse::<u8>().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Parse the content between `[` and `]` (no brackets) as an IPv6 address,
/// supporting `::` zero-run compression.
fn parse_ipv6(s: &str) -> Option<[u8; 16]> {
    if s.matches("::").count() > 1 {
        return None;
    }

    let (head, tail, has_elision) = match s.split_once("::") {
        Some((h, t)) => (h, t, true),
        None => (s, "", false),
    };

    let parse_groups = |part: &str| -> Option<Vec<u16>> {
        if part.is_empty() {
            return Some(Vec::new());
        }
        part.split(':')
            .map(|g| {
                if g.is_empty() || g.len() > 4 {
                    return None;
                }
                u16::from_str_radix(g, 16).ok()
            })
            .collect()
    };

    let head_groups = parse_groups(head)?;
    let tail_groups = parse_groups(tail)?;

    let mut groups: Vec<u16>;
    if has_elision {
        let filled = 8usize
            .checked_sub(head_groups.len() + tail_groups.len())?;
        groups = Vec::with_capacity(8);
        groups.extend(head_groups);
        groups.extend(std::iter::repeat(0u16).take(filled));
        groups.extend(tail_groups);
    } else {
        if head_groups.len() != 8 {
            return None;
        }
        groups = head_groups;
    }
    if groups.len() != 8 {
        return None;
    }

    let mut out = [0u8; 16];
    for (i, g) in groups.iter().enumerate() {
        out[i * 2] = (g >> 8) as u8;
        out[i * 2 + 1] = (g & 0xff) as u8;
    }
    Some(out)
}

/// Format a host address: IPv4 dotted-quad, or IPv6 bracketed with the
/// longest run of all-zero groups (length >= 1) replaced by `::`, ties
/// broken by earliest position.
pub fn host_to_str(h: &HostAddress) -> String {
    match h {
        HostAddress::V4(o) => format!("{}.{}.{}.{}", o[0], o[1], o[2], o[3]),
        HostAddress::V6(o) => {
            let mut groups = [0u16; 8];
            for i in 0..8 {
                groups[i] = ((o[i * 2] as u16) << 8) | o[i * 2 + 1] as u16;
            }
            format_ipv6(&groups)
        }
    }
}

fn format_ipv6(groups: &[u16; 8]) -> String {
    let (best_start, best_len) = longest_zero_run(groups);

    let mut out = String::from("[");
    if best_len == 0 {
        for (i, g) in groups.iter().enumerate() {
            if i > 0 {
                out.push(':');
            }
            out.push_str(&format!("{:x}", g));
        }
    } else {
        for (i, g) in groups.iter().enumerate().take(best_start) {
            if i > 0 {
                out.push(':');
            }
            out.push_str(&format!("{:x}", g));
        }
        out.push_str("::");
        for (i, g) in groups.iter().enumerate().skip(best_start + best_len) {
            if i > best_start + best_len {
                out.push(':');
            }
            out.push_str(&format!("{:x}", g));
        }
    }
    out.push(']');
    out
}

/// Returns (start, len) of the longest run of zero groups, earliest first.
/// len == 0 means no run worth compressing.
fn longest_zero_run(groups: &[u16; 8]) -> (usize, usize) {
    let mut best_start = 0;
    let mut best_len = 0;
    let mut cur_start = 0;
    let mut cur_len = 0;
    for (i, g) in groups.iter().enumerate() {
        if *g == 0 {
            if cur_len == 0 {
                cur_start = i;
            }
            cur_len += 1;
            if cur_len > best_len {
                best_len = cur_len;
                best_start = cur_start;
            }
        } else {
            cur_len = 0;
        }
    }
    (best_start, best_len)
}

/// A host + port pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketAddress {
    pub host: HostAddress,
    pub port: u16,
}

impl SocketAddress {
    pub fn new(host: HostAddress, port: u16) -> Self {
        Self { host, port }
    }
}

impl From<SocketAddr> for SocketAddress {
    fn from(a: SocketAddr) -> Self {
        SocketAddress::new(a.ip().into(), a.port())
    }
}

impl From<SocketAddress> for SocketAddr {
    fn from(a: SocketAddress) -> Self {
        SocketAddr::new(a.host.into(), a.port)
    }
}

/// Parse `host:port`, splitting on the last `:` outside brackets. Port must
/// be decimal in `1..=65535`.
pub fn socket_from_str(s: &str) -> Result<SocketAddress, ParseError> {
    let err = || ParseError(s.to_string());

    let (host_part, port_part) = if let Some(rest) = s.strip_prefix('[') {
        let end = rest.find(']').ok_or_else(err)?;
        let host_part = &s[..end + 2]; // include brackets
        let after = &rest[end + 1..];
        let port_part = after.strip_prefix(':').ok_or_else(err)?;
        (host_part, port_part)
    } else {
        let idx = s.rfind(':').ok_or_else(err)?;
        (&s[..idx], &s[idx + 1..])
    };

    let host = host_from_str(host_part).map_err(|_| err())?;
    let port: u16 = port_part.parse().map_err(|_| err())?;
    if port == 0 {
        return Err(err());
    }
    Ok(SocketAddress::new(host, port))
}

/// Format `host:port` (bracketed form for IPv6 hosts).
pub fn socket_to_str(a: &SocketAddress) -> String {
    format!("{}:{}", host_to_str(&a.host), a.port)
}

impl FromStr for SocketAddress {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        socket_from_str(s)
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", socket_to_str(self))
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", host_to_str(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ipv4() {
        assert_eq!(
            host_from_str("127.0.0.1").unwrap(),
            HostAddress::V4([127, 0, 0, 1])
        );
    }

    #[test]
    fn rejects_malformed_ipv4() {
        assert!(host_from_str("127.0.0.1.1").is_err());
        assert!(host_from_str("256.0.0.1").is_err());
        assert!(host_from_str("01.0.0.1").is_err());
        assert!(host_from_str("1.2.3").is_err());
    }

    #[test]
    fn parses_bracketed_ipv6() {
        let h = host_from_str("[::1]").unwrap();
        assert_eq!(h, HostAddress::V6([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]));
    }

    #[test]
    fn formats_ipv6_with_longest_run_compressed() {
        // 1:0:0:2:0:0:0:3 -> longest run is the three zeros before "3"
        let h = HostAddress::V6([
            0, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 3,
        ]);
        assert_eq!(host_to_str(&h), "[1:0:0:2::3]");
    }

    #[test]
    fn formats_ipv6_ties_broken_by_earliest() {
        // two equal-length zero runs: 1:0:0:2:0:0:3 -> first one compressed
        let h = HostAddress::V6([
            0, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 3, 0, 4,
        ]);
        assert_eq!(host_to_str(&h), "[1::2:0:0:3:4]");
    }

    #[test]
    fn formats_all_zero_as_double_colon() {
        let h = HostAddress::V6([0; 16]);
        assert_eq!(host_to_str(&h), "[::]");
    }

    #[test]
    fn host_roundtrip_ipv4() {
        for s in ["0.0.0.0", "255.255.255.255", "10.1.2.3"] {
            let h = host_from_str(s).unwrap();
            assert_eq!(host_to_str(&h), s);
        }
    }

    #[test]
    fn host_roundtrip_ipv6() {
        for s in ["[::]", "[::1]", "[2001:db8::1]", "[fe80::1:2:3:4]"] {
            let h = host_from_str(s).unwrap();
            let canon = host_to_str(&h);
            let h2 = host_from_str(&canon).unwrap();
            assert_eq!(h, h2);
        }
    }

    #[test]
    fn socket_roundtrip() {
        for s in ["127.0.0.1:80", "[::1]:443", "[2001:db8::1]:8080"] {
            let a = socket_from_str(s).unwrap();
            assert_eq!(socket_to_str(&a), s);
        }
    }

    #[test]
    fn socket_rejects_port_zero() {
        assert!(socket_from_str("127.0.0.1:0").is_err());
    }

    #[test]
    fn socket_rejects_missing_port() {
        assert!(socket_from_str("127.0.0.1").is_err());
        assert!(socket_from_str("[::1]").is_err());
    }
}
