use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::inputs::{ViewInput, ViewInputs};
use crate::cell::LatestCell;
use crate::config::PollingConfig;
use crate::filter::{Facet, FacetKind, FilterEngine, FilterSelection};
use crate::navigation::{Navigator, RouteParams};
use crate::poll::{PollScheduler, PollTask};
use crate::selection::{
    SelectionCommand, SelectionError, SelectionEvent, SelectionMachine, SelectionState, Store,
};
use crate::sequences::{Project, Sequence, unfinished_targets};
use crate::source::{SequenceSnapshot, SequenceSource};

/// The sequence view: filter, selection and polling around one data source.
///
/// Route and sequence-list changes are fed in through [`SequenceView::apply`].
/// Dropping the view cancels every poll loop.
pub struct SequenceView {
    source: Arc<dyn SequenceSource>,
    navigator: Arc<dyn Navigator>,
    config: PollingConfig,
    scheduler: PollScheduler,
    selection: SelectionMachine,
    filter: FilterEngine,
    project: Arc<LatestCell<Option<Project>>>,
    selected_context: LatestCell<Option<String>>,
    snapshot: SequenceSnapshot,
    current_sequence: Option<Sequence>,
    route: Option<RouteParams>,
    reconciled: bool,
}

impl SequenceView {
    pub fn new(
        source: Arc<dyn SequenceSource>,
        navigator: Arc<dyn Navigator>,
        config: PollingConfig,
    ) -> Self {
        Self {
            scheduler: PollScheduler::new(source.clone(), config.clone()),
            source,
            navigator,
            config,
            selection: SelectionMachine::new(),
            filter: FilterEngine::new(),
            project: Arc::new(LatestCell::new(None)),
            selected_context: LatestCell::new(None),
            snapshot: Arc::new(Vec::new()),
            current_sequence: None,
            route: None,
            reconciled: false,
        }
    }

    /// Start the sequence-list and unfinished-trace loops.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.scheduler.start_sequence_list(self.project.clone());
        self.scheduler.start_unfinished_traces(
            self.source.subscribe_sequences(),
            self.selected_context.subscribe(),
        );
        info!(event = "core.view.started");
    }

    /// Input stream for this view, given the host's route stream.
    pub fn inputs(&self, routes: watch::Receiver<RouteParams>) -> ViewInputs {
        ViewInputs::new(routes, self.source.subscribe_sequences())
    }

    pub fn apply(&mut self, input: ViewInput) {
        match input {
            ViewInput::Route(params) => self.on_route(params),
            ViewInput::Sequences(snapshot) => self.on_sequences(snapshot),
        }
    }

    fn on_route(&mut self, params: RouteParams) {
        debug!(event = "core.view.route_changed", route = ?params);

        match params.project_name.as_deref() {
            None => self.leave_project(),
            Some(name) if self.project_name().as_deref() != Some(name) => self.load_project(name),
            Some(_) => {}
        }

        self.route = Some(params);
        self.try_reconcile();
    }

    fn load_project(&mut self, name: &str) {
        match self.source.get_project(name) {
            Ok(Some(project)) => {
                match self.selection.dispatch(SelectionCommand::LoadProject {
                    project: project.clone(),
                }) {
                    Ok(events) => {
                        self.handle_events(events);
                        self.filter.rebuild_facets(&project, &project.sequences);
                        self.filter.clear_filters();
                        self.project.publish(Some(project));
                        info!(event = "core.view.project_loaded", project = name);
                    }
                    // Not ready yet: the route still names no usable project.
                    Err(e) => {
                        warn!(event = "core.view.project_load_failed", project = name, error = %e);
                        self.leave_project();
                    }
                }
            }
            Ok(None) => {
                warn!(
                    event = "core.view.project_load_failed",
                    project = name,
                    error = "project not found"
                );
                self.leave_project();
            }
            Err(e) => {
                warn!(event = "core.view.project_load_failed", project = name, error = %e);
                self.leave_project();
            }
        }
    }

    fn leave_project(&mut self) {
        if let Ok(events) = self.selection.dispatch(SelectionCommand::LeaveProject) {
            self.handle_events(events);
        }
        self.project.publish(None);
    }

    fn on_sequences(&mut self, snapshot: SequenceSnapshot) {
        if snapshot.is_empty() {
            debug!(event = "core.view.empty_snapshot_ignored");
            return;
        }

        self.filter.update_sequence_facet(&snapshot);
        let fresh = self.current_sequence.as_ref().and_then(|current| {
            snapshot
                .iter()
                .find(|s| s.shkeptncontext == current.shkeptncontext)
                .cloned()
        });
        if fresh.is_some() {
            self.current_sequence = fresh;
        }
        debug!(
            event = "core.view.sequences_updated",
            count = snapshot.len(),
            unfinished = unfinished_targets(&snapshot, self.selected_context().as_deref()).len()
        );
        self.snapshot = snapshot;
        self.try_reconcile();
    }

    /// Select the sequence named by the route, once per view.
    fn try_reconcile(&mut self) {
        if self.reconciled || self.snapshot.is_empty() {
            return;
        }
        let Some(route) = self.route.clone() else {
            return;
        };
        let Some(project) = self.project.latest() else {
            return;
        };
        if route.project_name.as_deref() != Some(project.name())
            || !self.snapshot.iter().any(|s| s.project == project.project_name)
        {
            return;
        }
        self.reconciled = true;

        let Some(context) = route.shkeptncontext.as_deref() else {
            return;
        };
        let found = self
            .snapshot
            .iter()
            .find(|s| s.shkeptncontext == context)
            .cloned();

        match found {
            Some(sequence) => {
                let stage = match route.event_id.as_deref() {
                    Some(event_id) => sequence.find_trace(event_id).map(|t| t.stage.clone()),
                    None => route.stage.clone(),
                };
                info!(event = "core.view.route_reconciled", shkeptncontext = context);
                if let Err(e) = self.select(sequence, stage, route.event_id.clone()) {
                    warn!(event = "core.view.route_reconcile_failed", error = %e);
                }
            }
            None => {
                info!(event = "core.view.load_until_root_started", shkeptncontext = context);
                if let Err(e) = self.source.load_until_root(&project, context) {
                    warn!(
                        event = "core.view.load_until_root_failed",
                        shkeptncontext = context,
                        error = %e
                    );
                }
            }
        }
    }

    /// Select a sequence of the current list by its context token.
    pub fn select_sequence(
        &mut self,
        context: &str,
        stage: Option<&str>,
        event_id: Option<&str>,
    ) -> Result<(), SelectionError> {
        let sequence = self
            .find_sequence(context)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownSequence {
                context: context.to_string(),
            })?;
        self.select(
            sequence,
            stage.map(str::to_string),
            event_id.map(str::to_string),
        )
    }

    fn select(
        &mut self,
        sequence: Sequence,
        stage: Option<String>,
        event_id: Option<String>,
    ) -> Result<(), SelectionError> {
        let events = self.selection.dispatch(SelectionCommand::SelectSequence {
            sequence: sequence.clone(),
            stage,
            event_id,
        })?;
        self.current_sequence = Some(sequence);
        self.handle_events(events);
        Ok(())
    }

    pub fn select_stage(&mut self, stage: &str) -> Result<(), SelectionError> {
        let events = self.selection.dispatch(SelectionCommand::SelectStage {
            stage: stage.to_string(),
        })?;
        self.handle_events(events);
        Ok(())
    }

    fn handle_events(&mut self, events: Vec<SelectionEvent>) {
        for event in events {
            match event {
                SelectionEvent::NavigationRequested { target } => {
                    self.navigator.navigate(&target.to_path());
                }
                SelectionEvent::TracePollRequested { context } => {
                    self.selected_context.publish(Some(context));
                    if let Some(sequence) = &self.current_sequence {
                        self.scheduler.start_selected_traces(sequence, Utc::now());
                    }
                }
                SelectionEvent::TracePollCancelled { context } => {
                    debug!(event = "core.view.trace_poll_cancelled", shkeptncontext = context);
                    self.scheduler.cancel(PollTask::SelectedTraces);
                    self.selected_context.publish(None);
                    self.current_sequence = None;
                }
                SelectionEvent::ProjectCleared => {
                    self.current_sequence = None;
                }
                SelectionEvent::ProjectLoaded { .. }
                | SelectionEvent::SequenceSelected { .. }
                | SelectionEvent::StageSelected { .. } => {}
            }
        }
    }

    /// Replace the active filter set.
    pub fn filters_changed(&mut self, selections: &[FilterSelection]) {
        self.filter.set_active_filters(selections);
    }

    /// The subsequence of `sequences` passing the active filters.
    pub fn filtered<'a>(&self, sequences: &'a [Sequence]) -> Vec<&'a Sequence> {
        self.filter.apply(sequences)
    }

    pub fn filtered_sequences(&self) -> Vec<Sequence> {
        self.filter
            .apply(&self.snapshot)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Unfinished sequences other than the selected one.
    pub fn unfinished_sequences(&self) -> Vec<Sequence> {
        let selected = self.selected_context();
        unfinished_targets(&self.snapshot, selected.as_deref())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Reload traces of one sequence on demand.
    pub fn reload_traces(&self, context: &str) -> Result<(), SelectionError> {
        let sequence = self
            .find_sequence(context)
            .ok_or_else(|| SelectionError::UnknownSequence {
                context: context.to_string(),
            })?;
        info!(event = "core.view.manual_reload_requested", shkeptncontext = context);
        if let Err(e) = self.source.load_traces(sequence) {
            warn!(event = "core.view.manual_reload_failed", shkeptncontext = context, error = %e);
        }
        Ok(())
    }

    /// True exactly when the sequence is too old to be polled.
    pub fn should_offer_manual_reload(&self, sequence: &Sequence) -> bool {
        self.should_offer_manual_reload_at(sequence, Utc::now())
    }

    pub fn should_offer_manual_reload_at(&self, sequence: &Sequence, now: DateTime<Utc>) -> bool {
        !sequence.is_live(now, self.config.live_window())
    }

    pub fn show_reload_button(&self, sequence: &Sequence) -> bool {
        self.should_offer_manual_reload(sequence)
    }

    pub fn traces_last_updated(&self, sequence: &Sequence) -> Option<DateTime<Utc>> {
        self.source.traces_last_updated(sequence)
    }

    pub fn project(&self) -> Option<Project> {
        self.project.latest()
    }

    fn project_name(&self) -> Option<String> {
        self.selection.state().project().map(str::to_string)
    }

    pub fn sequences(&self) -> SequenceSnapshot {
        self.snapshot.clone()
    }

    pub fn current_sequence(&self) -> Option<&Sequence> {
        self.current_sequence.as_ref()
    }

    pub fn selected_stage(&self) -> Option<&str> {
        self.selection.state().stage()
    }

    pub fn selection_state(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn facets(&self) -> &[Facet] {
        self.filter.facets()
    }

    pub fn active_filters(&self) -> &BTreeMap<FacetKind, Vec<String>> {
        self.filter.active_filters()
    }

    pub fn is_polling(&self, task: PollTask) -> bool {
        self.scheduler.is_running(task)
    }

    fn selected_context(&self) -> Option<String> {
        self.selected_context.latest()
    }

    fn find_sequence(&self, context: &str) -> Option<&Sequence> {
        self.snapshot.iter().find(|s| s.shkeptncontext == context)
    }

    /// Cancel every poll loop. No loop fires after this returns.
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
        info!(event = "core.view.shutdown_completed");
    }
}

impl std::fmt::Debug for SequenceView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceView")
            .field("selection", self.selection.state())
            .field("sequences", &self.snapshot.len())
            .field("reconciled", &self.reconciled)
            .finish_non_exhaustive()
    }
}
