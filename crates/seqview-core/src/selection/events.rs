use serde::{Deserialize, Serialize};

use crate::navigation::NavigationTarget;

/// What changed as a result of a dispatched [`SelectionCommand`].
///
/// Events within a single dispatch are ordered chronologically. Failures
/// use the error channel, never the event stream.
///
/// [`SelectionCommand`]: super::SelectionCommand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// A project became the active one; any previous selection is gone.
    ProjectLoaded { project: String },
    /// The view no longer shows a project.
    ProjectCleared,
    SequenceSelected {
        context: String,
        stage: Option<String>,
        event_id: Option<String>,
    },
    StageSelected { context: String, stage: String },
    /// The address should change to reflect the selection.
    NavigationRequested { target: NavigationTarget },
    /// Start (or restart) the selected-sequence trace poll.
    TracePollRequested { context: String },
    /// Stop the selected-sequence trace poll.
    TracePollCancelled { context: String },
}
