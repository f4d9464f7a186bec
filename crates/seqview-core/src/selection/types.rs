use serde::{Deserialize, Serialize};

use crate::sequences::{Project, Sequence};

/// Where the view currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionState {
    #[default]
    NoProject,
    ProjectLoaded {
        project: String,
    },
    SequenceSelected {
        project: String,
        context: String,
        stage: Option<String>,
    },
    EventSelected {
        project: String,
        context: String,
        event_id: String,
        stage: Option<String>,
    },
}

impl SelectionState {
    pub fn project(&self) -> Option<&str> {
        match self {
            SelectionState::NoProject => None,
            SelectionState::ProjectLoaded { project }
            | SelectionState::SequenceSelected { project, .. }
            | SelectionState::EventSelected { project, .. } => Some(project),
        }
    }

    /// Context token of the selected sequence, if any.
    pub fn context(&self) -> Option<&str> {
        match self {
            SelectionState::SequenceSelected { context, .. }
            | SelectionState::EventSelected { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn stage(&self) -> Option<&str> {
        match self {
            SelectionState::SequenceSelected { stage, .. }
            | SelectionState::EventSelected { stage, .. } => stage.as_deref(),
            _ => None,
        }
    }

    pub fn event_id(&self) -> Option<&str> {
        match self {
            SelectionState::EventSelected { event_id, .. } => Some(event_id),
            _ => None,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.context().is_some()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionState::NoProject => "no_project",
            SelectionState::ProjectLoaded { .. } => "project_loaded",
            SelectionState::SequenceSelected { .. } => "sequence_selected",
            SelectionState::EventSelected { .. } => "event_selected",
        }
    }
}

/// Operations that drive the selection machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionCommand {
    /// A project fetch succeeded. Clears any prior selection.
    LoadProject { project: Project },
    /// The route no longer resolves to a loaded project.
    LeaveProject,
    /// Select a sequence. Without `stage` or `event_id` the last stage wins.
    SelectSequence {
        sequence: Sequence,
        stage: Option<String>,
        event_id: Option<String>,
    },
    /// Change the stage of the selected sequence.
    SelectStage { stage: String },
}
