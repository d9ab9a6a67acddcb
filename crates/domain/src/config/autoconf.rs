use serde::{Deserialize, Serialize};

/// Reserved auto-config name answered locally instead of being forwarded.
///
/// Proxy auto-discovery clients resolve a well-known `wpad` label; the relay
/// answers it with a fixed local address so those lookups never leave the
/// host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutoconfConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// IPv4 address returned for the reserved name.
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_name() -> String {
    "wpad".to_string()
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for AutoconfConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            address: default_address(),
        }
    }
}
