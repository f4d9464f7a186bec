pub mod status;
pub mod types;

pub use status::{SequenceStatus, derive_status};
pub use types::{Project, Sequence, Service, Stage, Trace, TraceResult};

/// Sequences that still need trace polling.
///
/// Excludes finished sequences and the currently selected one, which is
/// polled by its own loop.
pub fn unfinished_targets<'a>(
    sequences: &'a [Sequence],
    selected: Option<&str>,
) -> Vec<&'a Sequence> {
    sequences
        .iter()
        .filter(|s| !s.is_finished() && Some(s.context()) != selected)
        .collect()
}
