//! seqview-core: Core library for watching pipeline sequences
//!
//! This library keeps a view of a project's sequences fresh: it polls the
//! data source, filters the list, and tracks which sequence and stage the
//! operator has selected. It is used by the CLI.
//!
//! # Main Entry Points
//!
//! - [`view`] - The sequence view controller
//! - [`poll`] - Periodic refresh loops
//! - [`selection`] - Selection state machine
//! - [`filter`] - Quick-filter facets
//! - [`source`] - Data source trait and implementations
//! - [`config`] - Configuration management

pub mod cell;
pub mod config;
pub mod errors;
pub mod events;
pub mod filter;
pub mod logging;
pub mod navigation;
pub mod poll;
pub mod selection;
pub mod sequences;
pub mod source;
pub mod view;

// Re-export commonly used types at crate root for convenience
pub use cell::LatestCell;
pub use config::SeqviewConfig;
pub use errors::{ConfigError, SeqviewError};
pub use filter::{Facet, FacetKind, FilterEngine, FilterOption, FilterSelection};
pub use navigation::{NavigationTarget, Navigator, RecordingNavigator, RouteParams};
pub use poll::{PollScheduler, PollTask, SelectedPoll, TaskSlot};
pub use selection::{
    SelectionCommand, SelectionError, SelectionEvent, SelectionMachine, SelectionState, Store,
};
pub use sequences::{Project, Sequence, SequenceStatus, Service, Stage, Trace, TraceResult};
pub use source::{FileSource, MemorySource, SequenceSnapshot, SequenceSource, SourceError};
pub use view::{SequenceView, ViewInput, ViewInputs};

// Re-export logging initialization
pub use logging::init_logging;
