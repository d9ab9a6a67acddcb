//! TCP transport for upstream DNS queries (RFC 1035 §4.2.2)
//!
//! Messages carry a two-byte big-endian length prefix. One connection per
//! exchange; the relay performs a single attempt per inbound query, so there
//! is nothing to pool.

use super::{DnsTransport, TransportReply};
use async_trait::async_trait;
use shunt_dns_domain::RelayError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, RelayError> {
        let mut stream = TcpStream::connect(self.server_addr).await.map_err(|e| {
            RelayError::Transport(format!(
                "Failed to connect to TCP server {}: {}",
                self.server_addr, e
            ))
        })?;

        stream.set_nodelay(true).map_err(|e| {
            RelayError::Transport(format!(
                "Failed to set TCP_NODELAY on {}: {}",
                self.server_addr, e
            ))
        })?;

        send_with_length_prefix(&mut stream, message_bytes)
            .await
            .map_err(|e| {
                RelayError::Transport(format!(
                    "Failed to send TCP query to {}: {}",
                    self.server_addr, e
                ))
            })?;

        recv_with_length_prefix(&mut stream).await.map_err(|e| {
            RelayError::Transport(format!(
                "Failed to receive TCP response from {}: {}",
                self.server_addr, e
            ))
        })
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportReply, RelayError> {
        if message_bytes.len() > MAX_TCP_MESSAGE_SIZE {
            return Err(RelayError::Transport(format!(
                "DNS message too large for TCP framing: {} bytes",
                message_bytes.len()
            )));
        }

        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| RelayError::UpstreamTimeout)??;

        debug!(
            server = %self.server_addr,
            bytes_received = bytes.len(),
            "TCP response received"
        );

        Ok(TransportReply {
            bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

async fn send_with_length_prefix(
    stream: &mut TcpStream,
    message_bytes: &[u8],
) -> std::io::Result<()> {
    let len = (message_bytes.len() as u16).to_be_bytes();
    stream.write_all(&len).await?;
    stream.write_all(message_bytes).await?;
    stream.flush().await
}

async fn recv_with_length_prefix(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let len = u16::from_be_bytes(len_buf) as usize;

    let mut msg_buf = vec![0u8; len];
    stream.read_exact(&mut msg_buf).await?;
    Ok(msg_buf)
}
