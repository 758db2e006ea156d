//! Engine configuration.
//!
//! `EngineConfig` is flattened into the CLI (`clap::Args`) and can also be
//! deserialized from query parameters or a JSON document. `Default` matches
//! the CLI defaults.

use clap::Args;
use serde::{Deserialize, Serialize};

/// Width of the stat-view bar for the largest file in a diff.
pub const STAT_BAR_WIDTH: usize = 40;

/// Author names in the blame gutter are cut to this many characters.
pub const BLAME_AUTHOR_WIDTH: usize = 20;

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Context lines around each diff hunk
    #[arg(long, default_value_t = 3)]
    pub context_lines: u32,

    /// Default number of commits on a log page
    #[arg(long, default_value_t = 50)]
    pub page_size: usize,

    /// Hard cap on commits collected by a single walk
    #[arg(long, default_value_t = 100)]
    pub max_commit_count: usize,

    /// Hard cap on commits returned by a search
    #[arg(long, default_value_t = 100)]
    pub max_results: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            page_size: 50,
            max_commit_count: 100,
            max_results: 100,
        }
    }
}

impl EngineConfig {
    /// Clamp a requested page size to `max_commit_count`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.page_size)
            .min(self.max_commit_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_page_size_and_cap() {
        let config = EngineConfig::default();
        assert_eq!(config.clamp_limit(None), 50);
        assert_eq!(config.clamp_limit(Some(10)), 10);
        assert_eq!(config.clamp_limit(Some(5000)), 100);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"context_lines": 5}"#).unwrap();
        assert_eq!(config.context_lines, 5);
        assert_eq!(config.max_results, 100);
    }
}
