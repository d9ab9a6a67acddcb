use serde::{Deserialize, Serialize};

use crate::blocklist::BlockList;

/// Suffix list selecting the filtered resolution path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockingConfig {
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,
}

fn default_suffixes() -> Vec<String> {
    vec!["twitter.com".to_string(), "facebook.com".to_string()]
}

impl BlockingConfig {
    pub fn block_list(&self) -> BlockList {
        BlockList::new(self.suffixes.clone())
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            suffixes: default_suffixes(),
        }
    }
}
