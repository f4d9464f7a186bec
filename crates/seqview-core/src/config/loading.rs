//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.seqview/config.toml` (global user preferences)
//! 3. **Project config** - `./.seqview/config.toml` (working-directory overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority, applied by the CLI)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::types::{PollingConfig, SeqviewConfig, SourceConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

const CONFIG_DIR: &str = ".seqview";
const CONFIG_FILE: &str = "config.toml";

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a present file cannot be parsed or validation fails.
/// Missing config files are not errors.
pub fn load_hierarchy() -> Result<SeqviewConfig, ConfigError> {
    let user_path = dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE));
    let project_path = std::env::current_dir()
        .map_err(|source| ConfigError::ConfigReadError {
            path: ".".to_string(),
            source,
        })?
        .join(CONFIG_DIR)
        .join(CONFIG_FILE);

    load_from_paths(user_path.as_deref(), &project_path)
}

/// Load and merge the given user and project config files.
pub fn load_from_paths(
    user_path: Option<&Path>,
    project_path: &Path,
) -> Result<SeqviewConfig, ConfigError> {
    let mut config = SeqviewConfig::default();

    if let Some(path) = user_path {
        match load_config_file(path) {
            Ok(user_config) => config = merge_configs(config, user_config),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
    }

    match load_config_file(project_path) {
        Ok(project_config) => config = merge_configs(config, project_config),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    validate_config(&config)?;

    debug!(event = "core.config.load_completed", config = ?config);
    Ok(config)
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<SeqviewConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Override values replace base values only if present.
pub fn merge_configs(base: SeqviewConfig, override_config: SeqviewConfig) -> SeqviewConfig {
    SeqviewConfig {
        polling: PollingConfig {
            sequence_list_interval_secs: override_config
                .polling
                .sequence_list_interval_secs
                .or(base.polling.sequence_list_interval_secs),
            unfinished_traces_interval_secs: override_config
                .polling
                .unfinished_traces_interval_secs
                .or(base.polling.unfinished_traces_interval_secs),
            selected_traces_interval_secs: override_config
                .polling
                .selected_traces_interval_secs
                .or(base.polling.selected_traces_interval_secs),
            live_window_hours: override_config
                .polling
                .live_window_hours
                .or(base.polling.live_window_hours),
        },
        source: SourceConfig {
            data_dir: override_config
                .source
                .data_dir
                .or(base.source.data_dir),
            page_size: override_config.source.page_size.or(base.source.page_size),
        },
    }
}

/// Path of the project-level config file relative to `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_DIR).join(CONFIG_FILE)
}
