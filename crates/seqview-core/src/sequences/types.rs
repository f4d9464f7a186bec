use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::status::{SequenceStatus, derive_status};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub service_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub stage_name: String,
}

/// A monitored project as returned by the data source.
///
/// Replaced wholesale on every refresh, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_name: String,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            project_name: name.into(),
            services: Vec::new(),
            stages: Vec::new(),
            sequences: Vec::new(),
        }
    }

    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services = services
            .into_iter()
            .map(|s| Service {
                service_name: s.into(),
            })
            .collect();
        self
    }

    pub fn with_stages<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages = stages
            .into_iter()
            .map(|s| Stage {
                stage_name: s.into(),
            })
            .collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.project_name
    }

    /// A project can back a view only once services and stages are known.
    pub fn is_loaded(&self) -> bool {
        !self.services.is_empty() && !self.stages.is_empty()
    }

    pub fn has_services(&self) -> bool {
        !self.services.is_empty()
    }
}

/// Outcome attached to a finished trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceResult {
    Pass,
    Warning,
    Fail,
}

/// A single event recorded for a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub id: String,
    pub stage: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TraceResult>,
}

impl Trace {
    pub fn new(
        id: impl Into<String>,
        stage: impl Into<String>,
        event_type: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            stage: stage.into(),
            event_type: event_type.into(),
            time,
            result: None,
        }
    }

    pub fn with_result(mut self, result: TraceResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn is_finished_event(&self) -> bool {
        self.event_type.ends_with(".finished")
    }
}

/// One execution of a delivery pipeline, keyed by its context token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sequence {
    pub shkeptncontext: String,
    pub name: String,
    pub project: String,
    pub service: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub traces: Vec<Trace>,
}

impl Sequence {
    pub fn new(
        shkeptncontext: impl Into<String>,
        name: impl Into<String>,
        project: impl Into<String>,
        service: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            shkeptncontext: shkeptncontext.into(),
            name: name.into(),
            project: project.into(),
            service: service.into(),
            time,
            traces: Vec::new(),
        }
    }

    pub fn with_traces(mut self, traces: Vec<Trace>) -> Self {
        self.traces = traces;
        self
    }

    pub fn context(&self) -> &str {
        &self.shkeptncontext
    }

    /// Distinct stage names in order of first appearance.
    pub fn stages(&self) -> Vec<&str> {
        let mut stages: Vec<&str> = Vec::new();
        for trace in &self.traces {
            if !stages.contains(&trace.stage.as_str()) {
                stages.push(&trace.stage);
            }
        }
        stages
    }

    /// Most recently entered stage, used as the default selection.
    pub fn last_stage(&self) -> Option<&str> {
        self.stages().last().copied()
    }

    pub fn has_stage(&self, stage: &str) -> bool {
        self.traces.iter().any(|t| t.stage == stage)
    }

    pub fn find_trace(&self, id: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.id == id)
    }

    pub fn status(&self) -> SequenceStatus {
        derive_status(self)
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_finished()
    }

    /// Whether the sequence started inside `window` before `now`.
    pub fn is_live(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.time > now - window
    }
}
