//! # Configuration System
//!
//! Hierarchical TOML configuration for seqview.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.seqview/config.toml`
//! 3. **Project config** - `./.seqview/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use seqview_core::config::SeqviewConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SeqviewConfig::load_hierarchy()?;
//!     let every = config.polling.sequence_list_interval();
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{PollingConfig, SeqviewConfig, SourceConfig};
pub use validation::validate_config;

use crate::errors::ConfigError;

impl SeqviewConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, ConfigError> {
        loading::load_hierarchy()
    }
}
