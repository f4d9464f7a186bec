use super::events::SelectionEvent;
use super::types::SelectionCommand;

/// Trait for dispatching selection commands.
///
/// # Semantics
///
/// - **Ordering**: Commands execute in the order received.
/// - **Events**: On success, dispatch returns the events describing what
///   changed, in order. A command may produce several events (a selection
///   both navigates and restarts the trace poll).
/// - **Errors**: A rejected command leaves the state untouched.
pub trait Store {
    type Error;
    fn dispatch(&mut self, cmd: SelectionCommand) -> Result<Vec<SelectionEvent>, Self::Error>;
}
