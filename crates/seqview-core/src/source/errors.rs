use crate::errors::SeqviewError;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Project '{name}' not found")]
    ProjectNotFound { name: String },

    #[error("Sequence '{context}' not found")]
    SequenceNotFound { context: String },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Data source lock poisoned")]
    LockPoisoned,
}

impl SeqviewError for SourceError {
    fn error_code(&self) -> &'static str {
        match self {
            SourceError::ProjectNotFound { .. } => "SOURCE_PROJECT_NOT_FOUND",
            SourceError::SequenceNotFound { .. } => "SOURCE_SEQUENCE_NOT_FOUND",
            SourceError::Io { .. } => "SOURCE_IO_ERROR",
            SourceError::Parse { .. } => "SOURCE_PARSE_ERROR",
            SourceError::LockPoisoned => "SOURCE_LOCK_POISONED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            SourceError::ProjectNotFound { .. } | SourceError::SequenceNotFound { .. }
        )
    }
}
