use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// The configured upstream resolver: one address, one transport.
///
/// Parsed once at startup from a URL-style string (`udp://8.8.8.8:53`,
/// `tcp://1.1.1.1:53`) and shared read-only by every in-flight forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamTarget {
    Udp { addr: SocketAddr },
    Tcp { addr: SocketAddr },
}

impl UpstreamTarget {
    pub fn socket_addr(&self) -> SocketAddr {
        match self {
            UpstreamTarget::Udp { addr } | UpstreamTarget::Tcp { addr } => *addr,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            UpstreamTarget::Udp { .. } => "UDP",
            UpstreamTarget::Tcp { .. } => "TCP",
        }
    }
}

impl Default for UpstreamTarget {
    fn default() -> Self {
        UpstreamTarget::Udp {
            addr: SocketAddr::from(([8, 8, 8, 8], 53)),
        }
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamTarget::Udp { addr } => write!(f, "udp://{}", addr),
            UpstreamTarget::Tcp { addr } => write!(f, "tcp://{}", addr),
        }
    }
}

fn parse_socket_addr(s: &str) -> Result<SocketAddr, String> {
    // Bare "host" without a port defaults to the standard DNS port.
    if let Ok(ip) = s.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, 53));
    }
    s.parse::<SocketAddr>()
        .map_err(|e| format!("Invalid upstream address '{}': {}", s, e))
}

impl FromStr for UpstreamTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("udp://") {
            return Ok(UpstreamTarget::Udp {
                addr: parse_socket_addr(rest)?,
            });
        }
        if let Some(rest) = s.strip_prefix("tcp://") {
            return Ok(UpstreamTarget::Tcp {
                addr: parse_socket_addr(rest)?,
            });
        }
        // No scheme means UDP, the standard DNS transport.
        Ok(UpstreamTarget::Udp {
            addr: parse_socket_addr(s)?,
        })
    }
}
