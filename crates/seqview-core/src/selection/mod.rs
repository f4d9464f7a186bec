//! Selection state of the sequence view.
//!
//! Commands go in through [`Store::dispatch`], events describing what
//! changed come out. The view turns those events into navigation and
//! trace-poll side effects.

pub mod errors;
pub mod events;
pub mod machine;
pub mod store;
pub mod types;

pub use errors::SelectionError;
pub use events::SelectionEvent;
pub use machine::SelectionMachine;
pub use store::Store;
pub use types::{SelectionCommand, SelectionState};
