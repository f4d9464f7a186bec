//! File-backed data source.
//!
//! Layout under the data directory:
//!
//! ```text
//! <root>/<project>/project.json    # Project (services, stages)
//! <root>/<project>/sequences.json  # [Sequence], newest first
//! ```
//!
//! Every load re-reads the files, so edits made while a view is running
//! show up on the next poll tick.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;

use super::{
    SequenceSnapshot, SequenceSource, SourceError, publish_traces, window_including,
};
use crate::cell::LatestCell;
use crate::sequences::{Project, Sequence};

const PROJECT_FILE: &str = "project.json";
const SEQUENCES_FILE: &str = "sequences.json";

#[derive(Debug, Default)]
struct FileState {
    windows: HashMap<String, usize>,
    last_updated: HashMap<String, DateTime<Utc>>,
}

#[derive(Debug)]
pub struct FileSource {
    root: PathBuf,
    page_size: usize,
    state: Mutex<FileState>,
    cell: LatestCell<SequenceSnapshot>,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>, page_size: usize) -> Self {
        Self {
            root: root.into(),
            page_size: page_size.max(1),
            state: Mutex::new(FileState::default()),
            cell: LatestCell::new(Arc::new(Vec::new())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, FileState>, SourceError> {
        self.state.lock().map_err(|_| SourceError::LockPoisoned)
    }

    /// Read and parse a JSON file. A missing file yields `Ok(None)`.
    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SourceError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SourceError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SourceError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn read_sequences(&self, project: &str) -> Result<Vec<Sequence>, SourceError> {
        let path = self.project_dir(project).join(SEQUENCES_FILE);
        Ok(Self::read_json(&path)?.unwrap_or_default())
    }

    fn window_for(&self, project: &str) -> Result<usize, SourceError> {
        let state = self.lock()?;
        Ok(state
            .windows
            .get(project)
            .copied()
            .unwrap_or(0)
            .max(self.page_size))
    }
}

impl SequenceSource for FileSource {
    fn get_project(&self, name: &str) -> Result<Option<Project>, SourceError> {
        let path = self.project_dir(name).join(PROJECT_FILE);
        let project: Option<Project> = Self::read_json(&path)?;
        debug!(
            event = "core.source.file.project_read",
            project = name,
            found = project.is_some()
        );
        Ok(project)
    }

    fn subscribe_sequences(&self) -> watch::Receiver<SequenceSnapshot> {
        self.cell.subscribe()
    }

    fn load_sequences(&self, project: &Project) -> Result<(), SourceError> {
        let name = project.name();
        let list = self.read_sequences(name)?;
        let window = self.window_for(name)?;
        let page: Vec<Sequence> = list.into_iter().take(window).collect();

        debug!(
            event = "core.source.file.sequences_loaded",
            project = name,
            count = page.len()
        );
        self.cell.publish(Arc::new(page));
        Ok(())
    }

    fn load_traces(&self, sequence: &Sequence) -> Result<(), SourceError> {
        let context = sequence.context();
        let list = self.read_sequences(&sequence.project)?;
        let updated = list
            .into_iter()
            .find(|s| s.shkeptncontext == context)
            .ok_or_else(|| SourceError::SequenceNotFound {
                context: context.to_string(),
            })?;

        self.lock()?
            .last_updated
            .insert(context.to_string(), Utc::now());

        publish_traces(&self.cell, &updated);

        debug!(
            event = "core.source.file.traces_loaded",
            context = context,
            traces = updated.traces.len()
        );
        Ok(())
    }

    fn load_until_root(&self, project: &Project, context: &str) -> Result<(), SourceError> {
        let name = project.name();
        let list = self.read_sequences(name)?;
        let index = list
            .iter()
            .position(|s| s.shkeptncontext == context)
            .ok_or_else(|| SourceError::SequenceNotFound {
                context: context.to_string(),
            })?;

        let window = window_including(index, self.page_size);
        self.lock()?.windows.insert(name.to_string(), window);

        debug!(
            event = "core.source.file.root_reached",
            project = name,
            context = context,
            window = window
        );
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
