use tokio::sync::watch;

use crate::navigation::RouteParams;
use crate::source::SequenceSnapshot;

/// One change the view has to react to.
#[derive(Debug, Clone)]
pub enum ViewInput {
    Route(RouteParams),
    Sequences(SequenceSnapshot),
}

/// Merges the route stream and the sequence-list stream.
///
/// Both are latest-value streams: when several updates land between two
/// reads only the newest one is delivered. The values current at
/// construction are delivered first.
#[derive(Debug)]
pub struct ViewInputs {
    routes: watch::Receiver<RouteParams>,
    sequences: watch::Receiver<SequenceSnapshot>,
    routes_open: bool,
    sequences_open: bool,
}

impl ViewInputs {
    pub fn new(
        mut routes: watch::Receiver<RouteParams>,
        mut sequences: watch::Receiver<SequenceSnapshot>,
    ) -> Self {
        routes.mark_changed();
        sequences.mark_changed();
        Self {
            routes,
            sequences,
            routes_open: true,
            sequences_open: true,
        }
    }

    /// Wait for the next input. `None` once both streams are closed.
    ///
    /// Route changes are delivered before sequence changes when both are
    /// pending.
    pub async fn next(&mut self) -> Option<ViewInput> {
        loop {
            tokio::select! {
                biased;
                changed = self.routes.changed(), if self.routes_open => match changed {
                    Ok(()) => {
                        let route = self.routes.borrow_and_update().clone();
                        return Some(ViewInput::Route(route));
                    }
                    Err(_) => self.routes_open = false,
                },
                changed = self.sequences.changed(), if self.sequences_open => match changed {
                    Ok(()) => {
                        let snapshot = self.sequences.borrow_and_update().clone();
                        return Some(ViewInput::Sequences(snapshot));
                    }
                    Err(_) => self.sequences_open = false,
                },
                else => return None,
            }
        }
    }

    /// Inputs that are ready right now, without waiting.
    pub fn drain(&mut self) -> Vec<ViewInput> {
        let mut ready = Vec::new();
        if self.routes.has_changed().unwrap_or(false) {
            ready.push(ViewInput::Route(self.routes.borrow_and_update().clone()));
        }
        if self.sequences.has_changed().unwrap_or(false) {
            ready.push(ViewInput::Sequences(
                self.sequences.borrow_and_update().clone(),
            ));
        }
        ready
    }
}
