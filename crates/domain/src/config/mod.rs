//! Configuration structures, organized by concern:
//! - `root`: main configuration, file loading and CLI overrides
//! - `server`: listening host and port
//! - `upstream`: upstream resolver URL and query timeout
//! - `autoconf`: reserved auto-config (WPAD) name and its answer address
//! - `blocking`: filtered-path suffix list
//! - `logging`: logging settings
//! - `errors`: configuration errors

pub mod autoconf;
pub mod blocking;
pub mod errors;
pub mod logging;
pub mod root;
pub mod server;
pub mod upstream;

pub use autoconf::AutoconfConfig;
pub use blocking::BlockingConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;
