use serde::{Deserialize, Serialize};

use crate::upstream::UpstreamTarget;

/// Upstream resolver configuration.
///
/// The URL scheme selects the transport: `udp://` or `tcp://`. A bare
/// `host:port` or `host` is treated as UDP.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

fn default_url() -> String {
    "udp://8.8.8.8:53".to_string()
}

fn default_query_timeout_ms() -> u64 {
    2000
}

impl UpstreamConfig {
    pub fn target(&self) -> Result<UpstreamTarget, String> {
        self.url.parse()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}
