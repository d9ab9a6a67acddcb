//! UDP transport for upstream DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is, no framing. Each exchange binds a fresh
//! ephemeral socket, so concurrent exchanges share no state.
//!
//! With the discard-first hint set (filtered path), the transport assumes an
//! on-path observer may inject a forged reply that races the legitimate one.
//! Selection rule, the documented property of this boundary: the earliest
//! reply is held, and if a second reply from the expected server arrives
//! within [`DUPLICATE_REPLY_GRACE`], the later reply wins; otherwise the held
//! reply is accepted. Datagrams from an unexpected source address are never
//! accepted in this mode.

use super::{DnsTransport, TransportReply};
use async_trait::async_trait;
use shunt_dns_domain::RelayError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// How long to keep listening for a later, legitimate reply after the first
/// one arrived when the discard-first hint is set.
pub const DUPLICATE_REPLY_GRACE: Duration = Duration::from_millis(500);

/// DNS over UDP transport
pub struct UdpTransport {
    server_addr: SocketAddr,
    discard_first: bool,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self {
            server_addr,
            discard_first: false,
        }
    }

    /// Enable the forged-reply discard rule for this transport.
    pub fn with_discard_first(mut self, discard_first: bool) -> Self {
        self.discard_first = discard_first;
        self
    }

    async fn bind_ephemeral(&self) -> Result<UdpSocket, RelayError> {
        // Bind to ephemeral port (0 = OS assigns)
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            "[::]:0".parse().map_err(|e| {
                RelayError::Transport(format!("Failed to build bind address: {}", e))
            })?
        };

        UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| RelayError::Transport(format!("Failed to bind UDP socket: {}", e)))
    }

    async fn recv_single(&self, socket: &UdpSocket) -> Result<Vec<u8>, RelayError> {
        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let (bytes_received, from_addr) = socket
            .recv_from(&mut recv_buf)
            .await
            .map_err(|e| self.recv_error(e))?;

        // Validate response came from expected server
        if from_addr.ip() != self.server_addr.ip() {
            warn!(
                expected = %self.server_addr,
                received_from = %from_addr,
                "UDP response from unexpected source"
            );
        }

        recv_buf.truncate(bytes_received);
        Ok(recv_buf)
    }

    /// Hold the earliest reply, prefer a later one arriving within the grace
    /// window. The overall deadline always wins, and a reply already in hand
    /// when it expires is accepted, not reported as a timeout.
    /// Unexpected-source datagrams are dropped outright here.
    async fn recv_discard_first(
        &self,
        socket: &UdpSocket,
        deadline: Instant,
    ) -> Result<Vec<u8>, RelayError> {
        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let mut held: Option<Vec<u8>> = None;
        let mut wait_until = deadline;

        loop {
            let (bytes_received, from_addr) =
                match timeout_at(wait_until, socket.recv_from(&mut recv_buf)).await {
                    // Window closed: the grace ran out with a reply in hand,
                    // or the whole exchange timed out empty-handed.
                    Err(_) => return held.ok_or(RelayError::UpstreamTimeout),
                    Ok(result) => result.map_err(|e| self.recv_error(e))?,
                };

            if from_addr.ip() != self.server_addr.ip() {
                warn!(
                    expected = %self.server_addr,
                    received_from = %from_addr,
                    "Dropping UDP reply from unexpected source"
                );
                continue;
            }

            if held.is_some() {
                debug!(
                    server = %self.server_addr,
                    "Later reply received, discarding suspect first reply"
                );
                return Ok(recv_buf[..bytes_received].to_vec());
            }

            held = Some(recv_buf[..bytes_received].to_vec());
            wait_until = deadline.min(Instant::now() + DUPLICATE_REPLY_GRACE);
        }
    }

    fn recv_error(&self, e: std::io::Error) -> RelayError {
        RelayError::Transport(format!(
            "Failed to receive UDP response from {}: {}",
            self.server_addr, e
        ))
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportReply, RelayError> {
        let socket = self.bind_ephemeral().await?;
        let deadline = Instant::now() + timeout;

        let bytes_sent = timeout_at(deadline, socket.send_to(message_bytes, self.server_addr))
            .await
            .map_err(|_| RelayError::UpstreamTimeout)?
            .map_err(|e| {
                RelayError::Transport(format!(
                    "Failed to send UDP query to {}: {}",
                    self.server_addr, e
                ))
            })?;

        debug!(
            server = %self.server_addr,
            bytes_sent = bytes_sent,
            discard_first = self.discard_first,
            "UDP query sent"
        );

        let bytes = if self.discard_first {
            self.recv_discard_first(&socket, deadline).await?
        } else {
            timeout_at(deadline, self.recv_single(&socket))
                .await
                .map_err(|_| RelayError::UpstreamTimeout)??
        };

        debug!(
            server = %self.server_addr,
            bytes_received = bytes.len(),
            "UDP response received"
        );

        Ok(TransportReply {
            bytes,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
