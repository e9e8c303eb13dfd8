//! Custom network security rules.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NsgProtocol {
    Tcp,
    Udp,
}

impl fmt::Display for NsgProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NsgProtocol::Tcp => "Tcp",
            NsgProtocol::Udp => "Udp",
        })
    }
}

/// Service tag the traffic originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NsgSource {
    AzureCloud,
    Internet,
}

impl fmt::Display for NsgSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NsgSource::AzureCloud => "AzureCloud",
            NsgSource::Internet => "Internet",
        })
    }
}

/// User-defined inbound allow rule. The default SSH rule is never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsgRule {
    pub protocol: NsgProtocol,
    /// Single port (`443`) or inclusive range (`8000-8080`).
    pub port: String,
    pub source: NsgSource,
}

/// Parse a port or port range, returning the inclusive bounds.
pub fn parse_port_range(port: &str) -> Option<(u16, u16)> {
    let parse = |s: &str| s.trim().parse::<u16>().ok().filter(|p| *p > 0);
    match port.split_once('-') {
        Some((low, high)) => {
            let (low, high) = (parse(low)?, parse(high)?);
            (low <= high).then_some((low, high))
        }
        None => parse(port).map(|p| (p, p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_port_and_range() {
        assert_eq!(parse_port_range("443"), Some((443, 443)));
        assert_eq!(parse_port_range("8000-8080"), Some((8000, 8080)));
    }

    #[test]
    fn rejects_bad_ports() {
        assert_eq!(parse_port_range("0"), None);
        assert_eq!(parse_port_range("70000"), None);
        assert_eq!(parse_port_range("90-80"), None);
        assert_eq!(parse_port_range("http"), None);
        assert_eq!(parse_port_range(""), None);
    }
}
