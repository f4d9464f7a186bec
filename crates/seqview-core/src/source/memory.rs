use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use super::{
    SequenceSnapshot, SequenceSource, SourceError, publish_traces, window_including,
};
use crate::cell::LatestCell;
use crate::sequences::{Project, Sequence};

/// Every request the view made of a source, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    GetProject(String),
    LoadSequences(String),
    LoadTraces(String),
    LoadUntilRoot { project: String, context: String },
}

#[derive(Debug, Default)]
struct MemoryState {
    projects: HashMap<String, Project>,
    /// Full backing list per project, newest first.
    sequences: HashMap<String, Vec<Sequence>>,
    windows: HashMap<String, usize>,
    last_updated: HashMap<String, DateTime<Utc>>,
    calls: Vec<SourceCall>,
    failing: bool,
}

/// In-process source backed by plain collections.
///
/// Records every call so hosts can inspect what the view asked for.
#[derive(Debug)]
pub struct MemorySource {
    state: Mutex<MemoryState>,
    cell: LatestCell<SequenceSnapshot>,
    page_size: usize,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self::with_page_size(usize::MAX)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            cell: LatestCell::new(Arc::new(Vec::new())),
            page_size: page_size.max(1),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, SourceError> {
        self.state.lock().map_err(|_| SourceError::LockPoisoned)
    }

    /// Register a project and its backing sequence list (newest first).
    pub fn insert_project(&self, project: Project, sequences: Vec<Sequence>) {
        if let Ok(mut state) = self.lock() {
            let name = project.project_name.clone();
            state.projects.insert(name.clone(), project);
            state.sequences.insert(name, sequences);
        }
    }

    /// Replace one sequence in the backing list, e.g. after new traces arrived.
    pub fn upsert_sequence(&self, sequence: Sequence) {
        if let Ok(mut state) = self.lock() {
            let list = state.sequences.entry(sequence.project.clone()).or_default();
            match list
                .iter_mut()
                .find(|s| s.shkeptncontext == sequence.shkeptncontext)
            {
                Some(existing) => *existing = sequence,
                None => list.insert(0, sequence),
            }
        }
    }

    /// Push a snapshot to subscribers without going through a load.
    pub fn publish(&self, sequences: Vec<Sequence>) {
        self.cell.publish(Arc::new(sequences));
    }

    /// Make subsequent load calls fail (they are still recorded).
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut state) = self.lock() {
            state.failing = failing;
        }
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut state) = self.lock() {
            state.calls.clear();
        }
    }

    pub fn trace_loads(&self, context: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SourceCall::LoadTraces(ctx) if ctx == context))
            .count()
    }

    pub fn sequence_loads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SourceCall::LoadSequences(_)))
            .count()
    }

    fn record(
        &self,
        call: SourceCall,
    ) -> Result<std::sync::MutexGuard<'_, MemoryState>, SourceError> {
        let mut state = self.lock()?;
        state.calls.push(call);
        Ok(state)
    }
}

impl SequenceSource for MemorySource {
    fn get_project(&self, name: &str) -> Result<Option<Project>, SourceError> {
        let state = self.record(SourceCall::GetProject(name.to_string()))?;
        Ok(state.projects.get(name).cloned())
    }

    fn subscribe_sequences(&self) -> watch::Receiver<SequenceSnapshot> {
        self.cell.subscribe()
    }

    fn load_sequences(&self, project: &Project) -> Result<(), SourceError> {
        let name = project.name();
        let state = self.record(SourceCall::LoadSequences(name.to_string()))?;
        if state.failing {
            return Err(SourceError::ProjectNotFound {
                name: name.to_string(),
            });
        }
        let list = state.sequences.get(name).cloned().unwrap_or_default();
        let window = state
            .windows
            .get(name)
            .copied()
            .unwrap_or(0)
            .max(self.page_size);
        drop(state);

        let page: Vec<Sequence> = list.into_iter().take(window).collect();
        debug!(
            event = "core.source.memory.sequences_loaded",
            project = name,
            count = page.len()
        );
        self.cell.publish(Arc::new(page));
        Ok(())
    }

    fn load_traces(&self, sequence: &Sequence) -> Result<(), SourceError> {
        let context = sequence.context();
        let mut state = self.record(SourceCall::LoadTraces(context.to_string()))?;
        if state.failing {
            return Err(SourceError::SequenceNotFound {
                context: context.to_string(),
            });
        }
        let updated = state
            .sequences
            .get(&sequence.project)
            .and_then(|list| list.iter().find(|s| s.shkeptncontext == context))
            .cloned();
        let Some(updated) = updated else {
            return Err(SourceError::SequenceNotFound {
                context: context.to_string(),
            });
        };
        state.last_updated.insert(context.to_string(), Utc::now());
        drop(state);

        publish_traces(&self.cell, &updated);
        Ok(())
    }

    fn load_until_root(&self, project: &Project, context: &str) -> Result<(), SourceError> {
        let name = project.name();
        let mut state = self.record(SourceCall::LoadUntilRoot {
            project: name.to_string(),
            context: context.to_string(),
        })?;
        let list = state.sequences.get(name).cloned().unwrap_or_default();
        let Some(index) = list.iter().position(|s| s.shkeptncontext == context) else {
            return Err(SourceError::SequenceNotFound {
                context: context.to_string(),
            });
        };
        let window = window_including(index, self.page_size);
        state.windows.insert(name.to_string(), window);
        drop(state);

        self.cell
            .publish(Arc::new(list.into_iter().take(window).collect()));
        Ok(())
    }

    fn traces_last_updated(&self, sequence: &Sequence) -> Option<DateTime<Utc>> {
        self.lock()
            .ok()
            .and_then(|s| s.last_updated.get(sequence.context()).copied())
    }
}
