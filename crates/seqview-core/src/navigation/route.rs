use serde::{Deserialize, Serialize};

use crate::sequences::Sequence;

/// Path parameters of the sequence view route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    pub project_name: Option<String>,
    pub shkeptncontext: Option<String>,
    pub stage: Option<String>,
    pub event_id: Option<String>,
}

impl RouteParams {
    pub fn project(name: impl Into<String>) -> Self {
        Self {
            project_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.shkeptncontext = Some(context.into());
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_event(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Parse `/project/<p>[/sequence/<ctx>[/stage/<s>|/event/<id>]]`.
    ///
    /// Segments that do not fit the shape are ignored rather than rejected;
    /// a path without a project segment yields empty params.
    pub fn parse_path(path: &str) -> Self {
        let segments: Vec<&str> = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let mut params = RouteParams::default();
        for pair in segments.chunks(2) {
            let [key, value] = pair else { break };
            let value = value.to_string();
            match *key {
                "project" => params.project_name = Some(value),
                "sequence" => params.shkeptncontext = Some(value),
                "stage" => params.stage = Some(value),
                "event" => params.event_id = Some(value),
                _ => {}
            }
        }

        if params.project_name.is_none() {
            return RouteParams::default();
        }
        params
    }
}

/// Where the view wants the address bar to point after a selection change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTarget {
    pub project: String,
    pub context: String,
    pub stage: Option<String>,
    pub event_id: Option<String>,
}

impl NavigationTarget {
    pub fn for_sequence(sequence: &Sequence, stage: Option<&str>, event_id: Option<&str>) -> Self {
        Self {
            project: sequence.project.clone(),
            context: sequence.shkeptncontext.clone(),
            stage: stage.map(str::to_string),
            event_id: event_id.map(str::to_string),
        }
    }

    /// Event routes take precedence over stage routes.
    pub fn to_path(&self) -> String {
        let base = format!("/project/{}/sequence/{}", self.project, self.context);
        match (&self.event_id, &self.stage) {
            (Some(event_id), _) => format!("{}/event/{}", base, event_id),
            (None, Some(stage)) => format!("{}/stage/{}", base, stage),
            (None, None) => base,
        }
    }
}
