//! Configuration type definitions.
//!
//! # Example Configuration
//!
//! ```toml
//! [polling]
//! sequence_list_interval_secs = 30
//! unfinished_traces_interval_secs = 10
//! selected_traces_interval_secs = 10
//! live_window_hours = 24
//!
//! [source]
//! data_dir = "./data"
//! page_size = 25
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults;

/// Main configuration loaded from TOML config files.
///
/// Loaded from `~/.seqview/config.toml`, then `./.seqview/config.toml`.
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SeqviewConfig {
    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub source: SourceConfig,
}

/// Poll loop timing.
///
/// Unset fields fall back to the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PollingConfig {
    /// Sequence-list refresh period. Default: 30 seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_list_interval_secs: Option<u64>,

    /// Trace refresh period for unfinished, unselected sequences.
    /// Default: 10 seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unfinished_traces_interval_secs: Option<u64>,

    /// Trace refresh period for the selected sequence. Default: 10 seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_traces_interval_secs: Option<u64>,

    /// Sequences started longer ago than this are not polled automatically.
    /// Default: 24 hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_window_hours: Option<u64>,
}

impl PollingConfig {
    pub fn sequence_list_interval(&self) -> Duration {
        Duration::from_secs(
            self.sequence_list_interval_secs
                .unwrap_or(defaults::SEQUENCE_LIST_INTERVAL_SECS),
        )
    }

    pub fn unfinished_traces_interval(&self) -> Duration {
        Duration::from_secs(
            self.unfinished_traces_interval_secs
                .unwrap_or(defaults::UNFINISHED_TRACES_INTERVAL_SECS),
        )
    }

    pub fn selected_traces_interval(&self) -> Duration {
        Duration::from_secs(
            self.selected_traces_interval_secs
                .unwrap_or(defaults::SELECTED_TRACES_INTERVAL_SECS),
        )
    }

    pub fn live_window(&self) -> chrono::Duration {
        let hours = self
            .live_window_hours
            .unwrap_or(defaults::LIVE_WINDOW_HOURS);
        let hours = i64::try_from(hours)
            .unwrap_or(i64::MAX)
            .min(defaults::MAX_LIVE_WINDOW_HOURS);
        chrono::Duration::hours(hours)
    }
}

/// Where sequence data is read from.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SourceConfig {
    /// Directory holding one sub-directory per project. Default: `./data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Number of sequences per page. Default: 25.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl SourceConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::DATA_DIR))
    }

    pub fn page_size(&self) -> usize {
        self.page_size.unwrap_or(defaults::PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = SeqviewConfig::default();
        assert_eq!(config.polling.sequence_list_interval(), Duration::from_secs(30));
        assert_eq!(
            config.polling.unfinished_traces_interval(),
            Duration::from_secs(10)
        );
        assert_eq!(
            config.polling.selected_traces_interval(),
            Duration::from_secs(10)
        );
        assert_eq!(config.polling.live_window(), chrono::Duration::hours(24));
        assert_eq!(config.source.page_size(), 25);
        assert_eq!(config.source.data_dir(), PathBuf::from("./data"));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: SeqviewConfig = toml::from_str(
            r#"
            [polling]
            sequence_list_interval_secs = 60

            [source]
            page_size = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.polling.sequence_list_interval(), Duration::from_secs(60));
        assert_eq!(
            config.polling.unfinished_traces_interval(),
            Duration::from_secs(10)
        );
        assert_eq!(config.source.page_size(), 5);
    }
}
