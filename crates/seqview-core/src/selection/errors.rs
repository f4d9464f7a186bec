use crate::errors::SeqviewError;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("No project is loaded")]
    NoProjectLoaded,

    #[error("No sequence is selected")]
    NoSequenceSelected,

    #[error("Project '{name}' has no services or stages yet")]
    ProjectNotReady { name: String },

    #[error("Sequence '{context}' not found")]
    UnknownSequence { context: String },

    #[error("Sequence '{context}' belongs to project '{project}'")]
    ForeignSequence { context: String, project: String },
}

impl SeqviewError for SelectionError {
    fn error_code(&self) -> &'static str {
        match self {
            SelectionError::NoProjectLoaded => "SELECTION_NO_PROJECT",
            SelectionError::NoSequenceSelected => "SELECTION_NO_SEQUENCE",
            SelectionError::ProjectNotReady { .. } => "SELECTION_PROJECT_NOT_READY",
            SelectionError::UnknownSequence { .. } => "SELECTION_UNKNOWN_SEQUENCE",
            SelectionError::ForeignSequence { .. } => "SELECTION_FOREIGN_SEQUENCE",
        }
    }

    fn is_user_error(&self) -> bool {
        !matches!(self, SelectionError::ProjectNotReady { .. })
    }
}
