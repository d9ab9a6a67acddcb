//! Relay lifecycle: one UDP and one TCP listener on the same address, bound
//! to a shared dispatcher.

use crate::dns::handler::RelayHandler;
use hickory_server::ServerFuture;
use shunt_dns_domain::{Config, RelayError};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tracing::info;

/// Per-connection timeout hickory applies to inbound TCP clients.
const TCP_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// A running relay owning its two listeners.
///
/// Dropping or stopping a `Relay` releases both sockets; a subsequent
/// [`Relay::start`] with the same configuration succeeds. Per-request faults
/// are contained by the serving loop and never tear the listeners down.
pub struct Relay {
    server: ServerFuture<RelayHandler>,
    local_addr: SocketAddr,
}

impl Relay {
    /// Bring both listeners up.
    ///
    /// Failure to bind is the only fatal startup error. Config-file
    /// validation happens in the CLI bootstrap; at this level port 0 is a
    /// deliberate override asking for an ephemeral port.
    pub async fn start(config: &Config) -> Result<Self, RelayError> {
        let handler = RelayHandler::from_config(config)?;

        let bind = format!("{}:{}", config.server.bind_address, config.server.port);
        let socket_addr: SocketAddr = bind
            .parse()
            .map_err(|e| RelayError::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        let udp_socket = UdpSocket::bind(socket_addr).await.map_err(|e| {
            RelayError::Transport(format!("Failed to bind UDP listener on {}: {}", socket_addr, e))
        })?;
        let local_addr = udp_socket
            .local_addr()
            .map_err(|e| RelayError::Transport(format!("Failed to read local address: {}", e)))?;
        info!(protocol = "UDP", addr = %local_addr, "DNS listener bound");

        // Bind TCP to the port the UDP socket actually got, so an ephemeral
        // port request (port 0) still lands both listeners on one port.
        let tcp_listener = TcpListener::bind(local_addr).await.map_err(|e| {
            RelayError::Transport(format!("Failed to bind TCP listener on {}: {}", local_addr, e))
        })?;
        info!(protocol = "TCP", addr = %local_addr, "DNS listener bound");

        let mut server = ServerFuture::new(handler);
        server.register_socket(udp_socket);
        server.register_listener(tcp_listener, TCP_CLIENT_TIMEOUT);

        info!(addr = %local_addr, upstream = %config.upstream.url, "Relay ready to accept queries");

        Ok(Self { server, local_addr })
    }

    /// The bound listening address; useful when the configured port was 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until the listeners are torn down externally.
    pub async fn wait(mut self) -> Result<(), RelayError> {
        self.server
            .block_until_done()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))
    }

    /// Close both listeners, draining in-flight exchanges first.
    pub async fn stop(mut self) -> Result<(), RelayError> {
        self.server
            .shutdown_gracefully()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        info!(addr = %self.local_addr, "Relay stopped");
        Ok(())
    }
}
