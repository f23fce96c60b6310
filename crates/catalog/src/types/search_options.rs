//! Options passed to the search-index query factory.

use serde::{Deserialize, Serialize};

/// Tuning knobs for a free-text search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Results per page when the caller does not paginate explicitly
    /// (default: 25).
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Maximum number of typographical errors tolerated per token (default: 2).
    #[serde(default = "default_num_typos")]
    pub num_typos: u8,

    /// Whether the last query token is matched as a prefix (default: true).
    #[serde(default = "default_prefix")]
    pub prefix: bool,

    /// Whether the engine should consider every prefix and typo variation
    /// instead of stopping early (default: false).
    #[serde(default)]
    pub exhaustive_search: bool,
}

fn default_per_page() -> u32 {
    25
}

fn default_num_typos() -> u8 {
    2
}

fn default_prefix() -> bool {
    true
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            num_typos: default_num_typos(),
            prefix: default_prefix(),
            exhaustive_search: false,
        }
    }
}

impl SearchOptions {
    /// Sets the page size.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Enables exhaustive search.
    pub fn exhaustive(mut self) -> Self {
        self.exhaustive_search = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let options: SearchOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, SearchOptions::default());
        assert_eq!(options.per_page, 25);
        assert!(options.prefix);
    }
}
