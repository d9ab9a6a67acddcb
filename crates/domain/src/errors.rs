use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RelayError {
    /// No upstream reply arrived within the query timeout.
    #[error("Upstream query timeout")]
    UpstreamTimeout,

    /// Send/receive/connect failure while talking to the upstream server.
    #[error("Upstream transport error: {0}")]
    Transport(String),

    #[error("Invalid domain name: {0}")]
    InvalidName(String),

    /// Upstream bytes the protocol codec rejected.
    #[error("Invalid upstream response: {0}")]
    BadResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
