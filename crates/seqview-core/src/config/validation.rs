use crate::config::types::SeqviewConfig;
use crate::errors::ConfigError;

/// Validate the merged configuration.
///
/// Zero intervals would spin the poll loops; zero window and page size
/// would make nothing pollable or loadable.
pub fn validate_config(config: &SeqviewConfig) -> Result<(), ConfigError> {
    let polling = &config.polling;
    let intervals = [
        (
            "polling.sequence_list_interval_secs",
            polling.sequence_list_interval_secs,
        ),
        (
            "polling.unfinished_traces_interval_secs",
            polling.unfinished_traces_interval_secs,
        ),
        (
            "polling.selected_traces_interval_secs",
            polling.selected_traces_interval_secs,
        ),
        ("polling.live_window_hours", polling.live_window_hours),
    ];

    for (key, value) in intervals {
        if value == Some(0) {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("{} must be greater than 0", key),
            });
        }
    }

    if config.source.page_size == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "source.page_size must be greater than 0".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SeqviewConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = SeqviewConfig::default();
        config.polling.unfinished_traces_interval_secs = Some(0);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("unfinished_traces_interval_secs"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = SeqviewConfig::default();
        config.source.page_size = Some(0);
        assert!(validate_config(&config).is_err());
    }
}
