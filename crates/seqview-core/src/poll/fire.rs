//! One firing of each poll loop.
//!
//! Each function reads the shared cells at the moment it runs and makes
//! fire-and-forget source calls. Failures are logged and left for the next
//! tick.

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cell::LatestCell;
use crate::sequences::{Project, Sequence, unfinished_targets};
use crate::source::{SequenceSnapshot, SequenceSource};

/// Re-fetch the latest known project and reload its sequence list.
///
/// Returns the name of the project that was refreshed, `None` when no
/// project is known yet.
pub fn refresh_sequence_list(
    source: &dyn SequenceSource,
    project: &LatestCell<Option<Project>>,
) -> Option<String> {
    let Some(name) = project.latest().map(|p| p.project_name) else {
        debug!(event = "core.poll.sequence_list_skipped", reason = "no_project");
        return None;
    };

    let fresh = match source.get_project(&name) {
        Ok(Some(fresh)) => fresh,
        Ok(None) => {
            warn!(
                event = "core.poll.project_refresh_failed",
                project = name,
                error = "project not found"
            );
            return Some(name);
        }
        Err(e) => {
            warn!(
                event = "core.poll.project_refresh_failed",
                project = name,
                error = %e
            );
            return Some(name);
        }
    };

    let has_services = fresh.has_services();
    // The view may have moved to another project while we were fetching.
    let replaced = project.publish_if(Some(fresh.clone()), |current| {
        current.as_ref().is_some_and(|p| p.project_name == name)
    });
    if !replaced {
        debug!(event = "core.poll.project_refresh_discarded", project = name);
        return Some(name);
    }

    if has_services {
        match source.load_sequences(&fresh) {
            Ok(()) => debug!(event = "core.poll.sequence_list_completed", project = name),
            Err(e) => warn!(
                event = "core.poll.sequence_list_failed",
                project = name,
                error = %e
            ),
        }
    }
    Some(name)
}

/// Reload traces of every unfinished sequence except the selected one.
///
/// Returns how many sequences were asked for.
pub fn refresh_unfinished_traces(
    source: &dyn SequenceSource,
    sequences: &watch::Receiver<SequenceSnapshot>,
    selected: &watch::Receiver<Option<String>>,
) -> usize {
    // Clone out of the cells: loading publishes into the same snapshot cell.
    let snapshot = sequences.borrow().clone();
    let selected = selected.borrow().clone();

    let targets = unfinished_targets(&snapshot, selected.as_deref());
    for sequence in &targets {
        load_traces(source, sequence);
    }
    debug!(
        event = "core.poll.unfinished_traces_completed",
        count = targets.len()
    );
    targets.len()
}

pub fn load_traces(source: &dyn SequenceSource, sequence: &Sequence) {
    if let Err(e) = source.load_traces(sequence) {
        warn!(
            event = "core.poll.traces_failed",
            shkeptncontext = sequence.context(),
            error = %e
        );
    }
}
