use crate::errors::ResolveError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Wire transport used to reach one upstream server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Udp,
    Tcp,
    /// DNS over TLS (RFC 7858).
    TcpTls,
}

impl Protocol {
    /// Standard port: 53 for plain DNS, 853 for DoT.
    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Udp | Protocol::Tcp => 53,
            Protocol::TcpTls => 853,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Udp => "udp",
            Protocol::Tcp => "tcp",
            Protocol::TcpTls => "tcp-tls",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "udp" => Ok(Protocol::Udp),
            "tcp" => Ok(Protocol::Tcp),
            "tcp-tls" => Ok(Protocol::TcpTls),
            other => Err(ResolveError::InvalidEndpoint(format!(
                "invalid protocol '{}'",
                other
            ))),
        }
    }
}

/// One (protocol, address, port) upstream endpoint. Immutable once built;
/// the address must be an IP literal, never a hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub protocol: Protocol,
    pub addr: SocketAddr,
}

impl Endpoint {
    pub fn new(protocol: Protocol, ip: IpAddr, port: u16) -> Self {
        Self {
            protocol,
            addr: SocketAddr::new(ip, port),
        }
    }

    pub fn is_ipv6(&self) -> bool {
        self.addr.is_ipv6()
    }

    /// The same endpoint reached over plain TCP.
    pub fn to_tcp(&self) -> Self {
        Self {
            protocol: Protocol::Tcp,
            addr: self.addr,
        }
    }
}

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        let port_str = rest.strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}

impl FromStr for Endpoint {
    type Err = ResolveError;

    /// Parses `[protocol://]host[:port]`. Protocol defaults to `udp`, port
    /// to the protocol's standard port. IPv6 literals must be bracketed
    /// when a port is present (`udp://[::1]:53`); a bare IPv6 literal is
    /// accepted as-is.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (protocol, rest) = match s.split_once("://") {
            Some((proto, rest)) => (proto.parse::<Protocol>()?, rest),
            None => (Protocol::Udp, s),
        };

        if rest.is_empty() {
            return Err(ResolveError::InvalidEndpoint(format!(
                "missing address in '{}'",
                s
            )));
        }

        // Bare IP literal, default port. An unbracketed IPv6 string with
        // colons lands here rather than being misread as host:port.
        if let Ok(ip) = rest.parse::<IpAddr>() {
            return Ok(Endpoint::new(protocol, ip, protocol.default_port()));
        }

        let (host, port) = parse_host_port(rest)
            .ok_or_else(|| ResolveError::InvalidEndpoint(format!("invalid address '{}'", rest)))?;

        let ip: IpAddr = host.parse().map_err(|_| {
            ResolveError::InvalidEndpoint(format!("'{}' is not an IP literal", host))
        })?;

        Ok(Endpoint::new(protocol, ip, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SocketAddr renders IPv6 bracketed ("[::1]:53").
        write!(f, "{}://{}", self.protocol, self.addr)
    }
}
