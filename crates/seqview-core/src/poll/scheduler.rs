use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use super::fire;
use super::slot::TaskSlot;
use crate::cell::LatestCell;
use crate::config::PollingConfig;
use crate::sequences::{Project, Sequence};
use crate::source::{SequenceSnapshot, SequenceSource};

/// `tokio::time::interval` panics on a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollTask {
    SequenceList,
    UnfinishedTraces,
    SelectedTraces,
}

impl PollTask {
    pub const ALL: [PollTask; 3] = [
        PollTask::SequenceList,
        PollTask::UnfinishedTraces,
        PollTask::SelectedTraces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PollTask::SequenceList => "sequence_list",
            PollTask::UnfinishedTraces => "unfinished_traces",
            PollTask::SelectedTraces => "selected_traces",
        }
    }
}

impl fmt::Display for PollTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the selected sequence is being kept fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedPoll {
    /// Started within the live window; traces reload every period.
    Periodic,
    /// Too old to poll; traces were loaded once.
    Once,
}

/// Owner of the view's three periodic loops.
///
/// Every loop is an independently cancellable tokio task. Dropping the
/// scheduler aborts all of them. Starting methods must be called from
/// within a tokio runtime.
pub struct PollScheduler {
    source: Arc<dyn SequenceSource>,
    config: PollingConfig,
    sequence_list: TaskSlot,
    unfinished_traces: TaskSlot,
    selected_traces: TaskSlot,
}

impl PollScheduler {
    pub fn new(source: Arc<dyn SequenceSource>, config: PollingConfig) -> Self {
        Self {
            source,
            config,
            sequence_list: TaskSlot::new(),
            unfinished_traces: TaskSlot::new(),
            selected_traces: TaskSlot::new(),
        }
    }

    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    /// Loop 1: keep the project and its sequence list fresh.
    ///
    /// Fires immediately, then every period, and additionally whenever the
    /// cell switches to a different project. Does nothing while no project
    /// is known.
    pub fn start_sequence_list(&mut self, project: Arc<LatestCell<Option<Project>>>) {
        let source = self.source.clone();
        let period = self.config.sequence_list_interval().max(MIN_PERIOD);

        let handle = tokio::spawn(async move {
            let mut changes = project.subscribe();
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_fired: Option<String> = None;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = changes.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        let name = changes
                            .borrow_and_update()
                            .as_ref()
                            .map(|p| p.project_name.clone());
                        if name.is_none() || name == last_fired {
                            continue;
                        }
                        ticker.reset();
                    }
                }
                debug!(event = "core.poll.tick", task = %PollTask::SequenceList);
                last_fired = fire::refresh_sequence_list(source.as_ref(), &project);
            }
        });

        self.install(PollTask::SequenceList, handle, period);
    }

    /// Loop 2: reload traces of unfinished sequences other than the selection.
    pub fn start_unfinished_traces(
        &mut self,
        sequences: watch::Receiver<SequenceSnapshot>,
        selected: watch::Receiver<Option<String>>,
    ) {
        let source = self.source.clone();
        let period = self.config.unfinished_traces_interval().max(MIN_PERIOD);

        let handle = spawn_periodic(PollTask::UnfinishedTraces, period, move || {
            fire::refresh_unfinished_traces(source.as_ref(), &sequences, &selected);
        });

        self.install(PollTask::UnfinishedTraces, handle, period);
    }

    /// Loop 3: keep the selected sequence's traces fresh.
    ///
    /// Replaces whatever selection poll was running before. A sequence
    /// older than the live window is loaded once and gets no timer.
    pub fn start_selected_traces(&mut self, sequence: &Sequence, now: DateTime<Utc>) -> SelectedPoll {
        if !sequence.is_live(now, self.config.live_window()) {
            self.selected_traces.cancel();
            info!(
                event = "core.poll.selected_traces_once",
                shkeptncontext = sequence.context()
            );
            fire::load_traces(self.source.as_ref(), sequence);
            return SelectedPoll::Once;
        }

        let source = self.source.clone();
        let period = self.config.selected_traces_interval().max(MIN_PERIOD);
        let target = sequence.clone();

        let handle = spawn_periodic(PollTask::SelectedTraces, period, move || {
            fire::load_traces(source.as_ref(), &target);
        });

        info!(
            event = "core.poll.selected_traces_started",
            shkeptncontext = sequence.context()
        );
        self.install(PollTask::SelectedTraces, handle, period);
        SelectedPoll::Periodic
    }

    pub fn cancel(&mut self, task: PollTask) {
        if self.is_running(task) {
            debug!(event = "core.poll.cancelled", task = %task);
        }
        self.slot_mut(task).cancel();
    }

    pub fn is_running(&self, task: PollTask) -> bool {
        self.slot(task).is_active()
    }

    /// Cancel every loop. No loop fires after this returns.
    pub fn shutdown(&mut self) {
        for task in PollTask::ALL {
            self.slot_mut(task).cancel();
        }
        debug!(event = "core.poll.shutdown_completed");
    }

    fn install(&mut self, task: PollTask, handle: JoinHandle<()>, period: Duration) {
        self.slot_mut(task).replace(Some(handle));
        debug!(
            event = "core.poll.started",
            task = %task,
            period_ms = period.as_millis() as u64
        );
    }

    fn slot(&self, task: PollTask) -> &TaskSlot {
        match task {
            PollTask::SequenceList => &self.sequence_list,
            PollTask::UnfinishedTraces => &self.unfinished_traces,
            PollTask::SelectedTraces => &self.selected_traces,
        }
    }

    fn slot_mut(&mut self, task: PollTask) -> &mut TaskSlot {
        match task {
            PollTask::SequenceList => &mut self.sequence_list,
            PollTask::UnfinishedTraces => &mut self.unfinished_traces,
            PollTask::SelectedTraces => &mut self.selected_traces,
        }
    }
}

impl fmt::Debug for PollScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollScheduler")
            .field("config", &self.config)
            .field("sequence_list", &self.sequence_list)
            .field("unfinished_traces", &self.unfinished_traces)
            .field("selected_traces", &self.selected_traces)
            .finish_non_exhaustive()
    }
}

/// Run `fire` immediately and then every `period` until aborted.
fn spawn_periodic<F>(task: PollTask, period: Duration, mut fire: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            debug!(event = "core.poll.tick", task = %task);
            fire();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequences::Trace;
    use crate::source::MemorySource;

    fn running(ctx: &str, time: DateTime<Utc>) -> Sequence {
        Sequence::new(ctx, "delivery", "demo", "carts", time).with_traces(vec![Trace::new(
            format!("{ctx}-1"),
            "dev",
            "sh.keptn.event.dev.delivery.triggered",
            time,
        )])
    }

    fn finished(ctx: &str) -> Sequence {
        let now = Utc::now();
        Sequence::new(ctx, "delivery", "demo", "carts", now).with_traces(vec![
            Trace::new(
                format!("{ctx}-1"),
                "dev",
                "sh.keptn.event.dev.delivery.triggered",
                now - chrono::Duration::minutes(5),
            ),
            Trace::new(
                format!("{ctx}-2"),
                "dev",
                "sh.keptn.event.dev.delivery.finished",
                now,
            ),
        ])
    }

    fn demo_project() -> Project {
        Project::new("demo")
            .with_services(["carts"])
            .with_stages(["dev", "staging", "prod"])
    }

    fn setup(sequences: Vec<Sequence>) -> (Arc<MemorySource>, PollScheduler) {
        let source = Arc::new(MemorySource::new());
        source.insert_project(demo_project(), sequences.clone());
        source.publish(sequences);
        let scheduler = PollScheduler::new(source.clone(), PollingConfig::default());
        (source, scheduler)
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_selection_polls_every_ten_seconds() {
        let now = Utc::now();
        let seq = running("ctx-a", now);
        let (source, mut scheduler) = setup(vec![seq.clone()]);

        assert_eq!(
            scheduler.start_selected_traces(&seq, now),
            SelectedPoll::Periodic
        );
        settle().await;
        assert_eq!(source.trace_loads("ctx-a"), 1);

        advance(25).await;
        assert_eq!(source.trace_loads("ctx-a"), 3);
        assert!(scheduler.is_running(PollTask::SelectedTraces));
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_selection_loads_once_without_timer() {
        let now = Utc::now();
        let seq = running("ctx-old", now - chrono::Duration::days(3));
        let (source, mut scheduler) = setup(vec![seq.clone()]);

        assert_eq!(scheduler.start_selected_traces(&seq, now), SelectedPoll::Once);
        assert_eq!(source.trace_loads("ctx-old"), 1);

        advance(60).await;
        assert_eq!(source.trace_loads("ctx-old"), 1);
        assert!(!scheduler.is_running(PollTask::SelectedTraces));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_selection_cancels_previous_poll() {
        let now = Utc::now();
        let a = running("ctx-a", now);
        let b = running("ctx-b", now);
        let (source, mut scheduler) = setup(vec![a.clone(), b.clone()]);

        scheduler.start_selected_traces(&a, now);
        advance(15).await;
        assert_eq!(source.trace_loads("ctx-a"), 2);

        scheduler.start_selected_traces(&b, now);
        advance(25).await;
        assert_eq!(source.trace_loads("ctx-a"), 2);
        assert_eq!(source.trace_loads("ctx-b"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_selection_cancels_previous_poll() {
        let now = Utc::now();
        let a = running("ctx-a", now);
        let old = running("ctx-old", now - chrono::Duration::hours(30));
        let (source, mut scheduler) = setup(vec![a.clone(), old.clone()]);

        scheduler.start_selected_traces(&a, now);
        settle().await;
        scheduler.start_selected_traces(&old, now);
        advance(40).await;
        assert_eq!(source.trace_loads("ctx-a"), 1);
        assert_eq!(source.trace_loads("ctx-old"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unfinished_poll_skips_selected_and_finished() {
        let now = Utc::now();
        let (source, mut scheduler) = setup(vec![
            running("ctx-a", now),
            running("ctx-b", now),
            finished("ctx-c"),
        ]);
        let selected = LatestCell::new(Some("ctx-b".to_string()));

        scheduler.start_unfinished_traces(source.subscribe_sequences(), selected.subscribe());
        advance(25).await;
        assert_eq!(source.trace_loads("ctx-a"), 3);
        assert_eq!(source.trace_loads("ctx-b"), 0);
        assert_eq!(source.trace_loads("ctx-c"), 0);

        // Selection read at fire time, not captured at start.
        selected.publish(Some("ctx-a".to_string()));
        advance(10).await;
        assert_eq!(source.trace_loads("ctx-a"), 3);
        assert_eq!(source.trace_loads("ctx-b"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_list_waits_for_project() {
        let (source, mut scheduler) = setup(vec![running("ctx-a", Utc::now())]);
        let project = Arc::new(LatestCell::new(None));

        scheduler.start_sequence_list(project.clone());
        advance(65).await;
        assert!(source.calls().is_empty());

        project.publish(Some(demo_project()));
        settle().await;
        assert_eq!(source.sequence_loads(), 1);

        advance(35).await;
        assert_eq!(source.sequence_loads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_list_refresh_does_not_retrigger_itself() {
        let (source, mut scheduler) = setup(Vec::new());
        let project = Arc::new(LatestCell::new(Some(demo_project())));

        scheduler.start_sequence_list(project.clone());
        advance(45).await;
        // Fires at 0 and 30 only, even though each fire republishes the project.
        assert_eq!(source.sequence_loads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_is_not_retried_before_next_tick() {
        let now = Utc::now();
        let seq = running("ctx-a", now);
        let (source, mut scheduler) = setup(vec![seq.clone()]);
        source.set_failing(true);

        scheduler.start_selected_traces(&seq, now);
        advance(5).await;
        assert_eq!(source.trace_loads("ctx-a"), 1);

        advance(10).await;
        assert_eq!(source.trace_loads("ctx-a"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_every_loop() {
        let now = Utc::now();
        let seq = running("ctx-a", now);
        let (source, mut scheduler) = setup(vec![seq.clone(), running("ctx-b", now)]);
        let project = Arc::new(LatestCell::new(Some(demo_project())));
        let selected = LatestCell::new(Some("ctx-a".to_string()));

        scheduler.start_sequence_list(project);
        scheduler.start_unfinished_traces(source.subscribe_sequences(), selected.subscribe());
        scheduler.start_selected_traces(&seq, now);
        settle().await;
        assert!(PollTask::ALL.iter().all(|t| scheduler.is_running(*t)));

        scheduler.shutdown();
        source.clear_calls();
        advance(120).await;
        assert!(source.calls().is_empty());
        assert!(PollTask::ALL.iter().all(|t| !scheduler.is_running(*t)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_every_loop() {
        let now = Utc::now();
        let seq = running("ctx-a", now);
        let (source, mut scheduler) = setup(vec![seq.clone()]);
        scheduler.start_selected_traces(&seq, now);
        settle().await;

        drop(scheduler);
        source.clear_calls();
        advance(60).await;
        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_one_leaves_others_running() {
        let now = Utc::now();
        let seq = running("ctx-a", now);
        let (source, mut scheduler) = setup(vec![seq.clone(), running("ctx-b", now)]);
        let selected = LatestCell::new(Some("ctx-a".to_string()));

        scheduler.start_unfinished_traces(source.subscribe_sequences(), selected.subscribe());
        scheduler.start_selected_traces(&seq, now);
        settle().await;
        scheduler.cancel(PollTask::SelectedTraces);

        advance(25).await;
        assert_eq!(source.trace_loads("ctx-a"), 1);
        assert_eq!(source.trace_loads("ctx-b"), 3);
    }
}
