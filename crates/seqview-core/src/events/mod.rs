//! Command lifecycle events.
//!
//! Every CLI invocation logs one `command_started` and one
//! `command_finished`; failures additionally log `command_failed` with the
//! error code of the seqview error behind them, when there is one.

use std::error::Error;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::SeqviewConfig;
use crate::errors::{ConfigError, SeqviewError};
use crate::selection::SelectionError;
use crate::source::SourceError;

pub fn log_command_started(command: &str, config: &SeqviewConfig) {
    info!(
        event = "core.app.command_started",
        version = env!("CARGO_PKG_VERSION"),
        command = command,
        data_dir = %config.source.data_dir().display(),
        page_size = config.source.page_size()
    );
}

pub fn log_command_finished(command: &str, elapsed: Duration, success: bool) {
    info!(
        event = "core.app.command_finished",
        command = command,
        success = success,
        elapsed_ms = elapsed.as_millis() as u64
    );
}

/// Log a failed command. User errors (bad input, missing data) are
/// warnings; everything else is an error.
pub fn log_command_failed(command: &str, err: &(dyn Error + 'static)) {
    let (code, user_error) = classify(err);
    if user_error {
        warn!(
            event = "core.app.command_failed",
            command = command,
            error = %err,
            error_code = code
        );
    } else {
        error!(
            event = "core.app.command_failed",
            command = command,
            error = %err,
            error_code = code
        );
    }
}

/// Error code and user-error flag of a seqview error, `UNKNOWN` otherwise.
pub fn classify(err: &(dyn Error + 'static)) -> (&'static str, bool) {
    fn codes(e: &impl SeqviewError) -> (&'static str, bool) {
        (e.error_code(), e.is_user_error())
    }

    if let Some(e) = err.downcast_ref::<SourceError>() {
        codes(e)
    } else if let Some(e) = err.downcast_ref::<SelectionError>() {
        codes(e)
    } else if let Some(e) = err.downcast_ref::<ConfigError>() {
        codes(e)
    } else {
        ("UNKNOWN", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_events() {
        log_command_started("list", &SeqviewConfig::default());
        log_command_finished("list", Duration::from_millis(12), true);

        let err: Box<dyn Error> = Box::new(SelectionError::NoSequenceSelected);
        log_command_failed("show", err.as_ref());
    }

    #[test]
    fn test_classify_seqview_errors() {
        let err: Box<dyn Error> = Box::new(SelectionError::UnknownSequence {
            context: "ctx-1".to_string(),
        });
        let (code, user_error) = classify(err.as_ref());
        assert_eq!(code, SelectionError::UnknownSequence { context: String::new() }.error_code());
        assert!(user_error);

        let err: Box<dyn Error> = Box::new(SourceError::LockPoisoned);
        assert_eq!(classify(err.as_ref()), (SourceError::LockPoisoned.error_code(), false));
    }

    #[test]
    fn test_classify_foreign_error() {
        let err: Box<dyn Error> = "Project 'demo' not found".into();
        assert_eq!(classify(err.as_ref()), ("UNKNOWN", false));
    }
}
