pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use shunt_dns_domain::{RelayError, UpstreamTarget};
use std::time::Duration;

/// Raw reply bytes from one upstream exchange.
#[derive(Debug)]
pub struct TransportReply {
    pub bytes: Vec<u8>,
    pub protocol_used: &'static str,
}

/// One request/reply exchange with the upstream server.
///
/// `timeout` bounds the whole exchange; on expiry the implementation returns
/// `RelayError::UpstreamTimeout` and the exchange is over, no retry.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportReply, RelayError>;

    fn protocol_name(&self) -> &'static str;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportReply, RelayError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
        }
    }
}

/// Build the transport for the configured upstream target.
///
/// `discard_first` is the forgery-resistance hint used by the filtered path:
/// a UDP transport built with it treats the earliest reply as suspect (see
/// [`udp::UdpTransport`]). TCP is a connected stream an off-path injector
/// cannot write into, so the hint is a no-op there.
pub fn create_transport(target: &UpstreamTarget, discard_first: bool) -> Transport {
    match target {
        UpstreamTarget::Udp { addr } => {
            Transport::Udp(udp::UdpTransport::new(*addr).with_discard_first(discard_first))
        }
        UpstreamTarget::Tcp { addr } => Transport::Tcp(tcp::TcpTransport::new(*addr)),
    }
}
