//! Data source collaborators.
//!
//! The view never fetches on its own; it asks a [`SequenceSource`] to load
//! and reads the results back from the source's sequence cell. Load calls
//! are fire-and-forget: their `Result` is only logged, retry and backoff
//! belong to the source.

pub mod errors;
pub mod file;
pub mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::cell::LatestCell;
use crate::sequences::{Project, Sequence};

pub use errors::SourceError;
pub use file::FileSource;
pub use memory::{MemorySource, SourceCall};

/// Immutable snapshot of the currently loaded sequence list.
pub type SequenceSnapshot = Arc<Vec<Sequence>>;

pub trait SequenceSource: Send + Sync {
    /// Fetch a project. `Ok(None)` means the project does not exist.
    fn get_project(&self, name: &str) -> Result<Option<Project>, SourceError>;

    /// Latest-value stream of the loaded sequence list.
    fn subscribe_sequences(&self) -> watch::Receiver<SequenceSnapshot>;

    fn load_sequences(&self, project: &Project) -> Result<(), SourceError>;

    fn load_traces(&self, sequence: &Sequence) -> Result<(), SourceError>;

    /// Keep loading older sequences until `context` is part of the list.
    fn load_until_root(&self, project: &Project, context: &str) -> Result<(), SourceError>;

    fn traces_last_updated(&self, sequence: &Sequence) -> Option<DateTime<Utc>>;
}

/// Smallest whole number of pages that includes position `index`.
pub(crate) fn window_including(index: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    (index / page_size + 1).saturating_mul(page_size)
}

/// Swap the traces of `updated` into the published snapshot in one step.
///
/// Works on whatever list is current at that moment, so a newer list
/// published concurrently is never replaced by an older one. Returns false,
/// without waking subscribers, when the current list lacks the sequence.
pub(crate) fn publish_traces(cell: &LatestCell<SequenceSnapshot>, updated: &Sequence) -> bool {
    cell.update_if(|current| {
        if !current
            .iter()
            .any(|s| s.shkeptncontext == updated.shkeptncontext)
        {
            return false;
        }
        *current = Arc::new(with_traces_replaced(current, updated));
        true
    })
}

/// Replace the traces of `updated` inside a snapshot, keeping list order.
pub(crate) fn with_traces_replaced(list: &[Sequence], updated: &Sequence) -> Vec<Sequence> {
    list.iter()
        .map(|s| {
            if s.shkeptncontext == updated.shkeptncontext {
                let mut s = s.clone();
                s.traces = updated.traces.clone();
                s
            } else {
                s.clone()
            }
        })
        .collect()
}
