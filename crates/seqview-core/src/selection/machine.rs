use tracing::{debug, info, warn};

use super::errors::SelectionError;
use super::events::SelectionEvent;
use super::store::Store;
use super::types::{SelectionCommand, SelectionState};
use crate::navigation::NavigationTarget;
use crate::sequences::{Project, Sequence};

/// Selection state of one sequence view.
#[derive(Debug, Default)]
pub struct SelectionMachine {
    state: SelectionState,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    fn load_project(&mut self, project: &Project) -> Result<Vec<SelectionEvent>, SelectionError> {
        if !project.is_loaded() {
            return Err(SelectionError::ProjectNotReady {
                name: project.project_name.clone(),
            });
        }

        let mut events = Vec::new();
        if let Some(context) = self.state.context() {
            events.push(SelectionEvent::TracePollCancelled {
                context: context.to_string(),
            });
        }
        self.state = SelectionState::ProjectLoaded {
            project: project.project_name.clone(),
        };
        events.push(SelectionEvent::ProjectLoaded {
            project: project.project_name.clone(),
        });
        Ok(events)
    }

    fn leave_project(&mut self) -> Vec<SelectionEvent> {
        let mut events = Vec::new();
        if let Some(context) = self.state.context() {
            events.push(SelectionEvent::TracePollCancelled {
                context: context.to_string(),
            });
        }
        if self.state != SelectionState::NoProject {
            events.push(SelectionEvent::ProjectCleared);
        }
        self.state = SelectionState::NoProject;
        events
    }

    fn select_sequence(
        &mut self,
        sequence: &Sequence,
        stage: Option<String>,
        event_id: Option<String>,
    ) -> Result<Vec<SelectionEvent>, SelectionError> {
        let project = self
            .state
            .project()
            .ok_or(SelectionError::NoProjectLoaded)?
            .to_string();
        if sequence.project != project {
            return Err(SelectionError::ForeignSequence {
                context: sequence.shkeptncontext.clone(),
                project: sequence.project.clone(),
            });
        }

        let context = sequence.shkeptncontext.clone();
        let stage = match (&event_id, stage) {
            (_, Some(stage)) => Some(stage),
            (Some(id), None) => sequence
                .find_trace(id)
                .map(|t| t.stage.clone())
                .or_else(|| sequence.last_stage().map(str::to_string)),
            (None, None) => sequence.last_stage().map(str::to_string),
        };

        let target = NavigationTarget::for_sequence(sequence, stage.as_deref(), event_id.as_deref());
        self.state = match &event_id {
            Some(event_id) => SelectionState::EventSelected {
                project,
                context: context.clone(),
                event_id: event_id.clone(),
                stage: stage.clone(),
            },
            None => SelectionState::SequenceSelected {
                project,
                context: context.clone(),
                stage: stage.clone(),
            },
        };

        Ok(vec![
            SelectionEvent::SequenceSelected {
                context: context.clone(),
                stage,
                event_id,
            },
            SelectionEvent::NavigationRequested { target },
            SelectionEvent::TracePollRequested { context },
        ])
    }

    fn select_stage(&mut self, new_stage: String) -> Result<Vec<SelectionEvent>, SelectionError> {
        let (project, context) = match &self.state {
            SelectionState::SequenceSelected {
                project, context, ..
            }
            | SelectionState::EventSelected {
                project, context, ..
            } => (project.clone(), context.clone()),
            _ => return Err(SelectionError::NoSequenceSelected),
        };
        // A stage pick leaves an event route for the stage route.
        self.state = SelectionState::SequenceSelected {
            project: project.clone(),
            context: context.clone(),
            stage: Some(new_stage.clone()),
        };

        let target = NavigationTarget {
            project,
            context: context.clone(),
            stage: Some(new_stage.clone()),
            event_id: None,
        };
        Ok(vec![
            SelectionEvent::StageSelected {
                context,
                stage: new_stage,
            },
            SelectionEvent::NavigationRequested { target },
        ])
    }
}

impl Store for SelectionMachine {
    type Error = SelectionError;

    fn dispatch(&mut self, cmd: SelectionCommand) -> Result<Vec<SelectionEvent>, SelectionError> {
        debug!(
            event = "core.selection.dispatch_started",
            state = self.state.name()
        );

        let result = match cmd {
            SelectionCommand::LoadProject { project } => self.load_project(&project),
            SelectionCommand::LeaveProject => Ok(self.leave_project()),
            SelectionCommand::SelectSequence {
                sequence,
                stage,
                event_id,
            } => self.select_sequence(&sequence, stage, event_id),
            SelectionCommand::SelectStage { stage } => self.select_stage(stage),
        };

        match &result {
            Ok(events) => info!(
                event = "core.selection.dispatch_completed",
                state = self.state.name(),
                event_count = events.len()
            ),
            Err(e) => warn!(
                event = "core.selection.dispatch_rejected",
                state = self.state.name(),
                error = %e
            ),
        }
        result
    }
}
