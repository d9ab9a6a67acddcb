use serde::{Deserialize, Serialize};

use super::autoconf::AutoconfConfig;
use super::blocking::BlockingConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;

/// Main configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listening host and port.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream resolver and query timeout.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Reserved auto-config name.
    #[serde(default)]
    pub autoconf: AutoconfConfig,

    /// Filtered-path suffix list.
    #[serde(default)]
    pub blocking: BlockingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub upstream_url: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from file or use defaults.
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. shunt-dns.toml in current directory
    /// 3. /etc/shunt-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("shunt-dns.toml").exists() {
            Self::from_file("shunt-dns.toml")?
        } else if std::path::Path::new("/etc/shunt-dns/config.toml").exists() {
            Self::from_file("/etc/shunt-dns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(url) = overrides.upstream_url {
            self.upstream.url = url;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration before bring-up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        self.upstream
            .target()
            .map_err(ConfigError::Validation)?;

        self.autoconf
            .address
            .parse::<std::net::Ipv4Addr>()
            .map_err(|e| {
                ConfigError::Validation(format!(
                    "Invalid autoconf address '{}': {}",
                    self.autoconf.address, e
                ))
            })?;

        Ok(())
    }
}
