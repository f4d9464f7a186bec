use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{Sequence, TraceResult};

/// Derived state of a sequence.
///
/// `Succeeded` and `Failed` are terminal: a sequence in either state is
/// finished and no longer polled for unfinished traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStatus {
    Started,
    Failed,
    Succeeded,
    Waiting,
}

impl SequenceStatus {
    pub const ALL: [SequenceStatus; 4] = [
        SequenceStatus::Started,
        SequenceStatus::Failed,
        SequenceStatus::Succeeded,
        SequenceStatus::Waiting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceStatus::Started => "started",
            SequenceStatus::Failed => "failed",
            SequenceStatus::Succeeded => "succeeded",
            SequenceStatus::Waiting => "waiting",
        }
    }

    /// Label shown in the Status facet.
    pub fn label(&self) -> &'static str {
        match self {
            SequenceStatus::Started => "Active",
            SequenceStatus::Failed => "Failed",
            SequenceStatus::Succeeded => "Succeeded",
            SequenceStatus::Waiting => "Waiting",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, SequenceStatus::Succeeded | SequenceStatus::Failed)
    }
}

impl fmt::Display for SequenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SequenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "started" => Ok(SequenceStatus::Started),
            "failed" => Ok(SequenceStatus::Failed),
            "succeeded" => Ok(SequenceStatus::Succeeded),
            "waiting" => Ok(SequenceStatus::Waiting),
            other => Err(format!(
                "Invalid sequence status '{}'. Valid: started, failed, succeeded, waiting",
                other
            )),
        }
    }
}

/// Derive a sequence's status from its traces.
///
/// Priority order:
/// 1. No traces yet → `Waiting`
/// 2. Any finished event with a `fail` result → `Failed`
/// 3. Latest event closes the sequence for its stage → `Succeeded`
/// 4. Latest event is an open approval request → `Waiting`
/// 5. Otherwise → `Started`
pub fn derive_status(sequence: &Sequence) -> SequenceStatus {
    let Some(latest) = sequence.traces.iter().max_by_key(|t| t.time) else {
        return SequenceStatus::Waiting;
    };

    let failed = sequence
        .traces
        .iter()
        .any(|t| t.is_finished_event() && t.result == Some(TraceResult::Fail));
    if failed {
        return SequenceStatus::Failed;
    }

    let sequence_finished = format!(
        "sh.keptn.event.{}.{}.finished",
        latest.stage, sequence.name
    );
    if latest.event_type == sequence_finished {
        return SequenceStatus::Succeeded;
    }

    if latest.event_type.ends_with(".approval.triggered") {
        return SequenceStatus::Waiting;
    }

    SequenceStatus::Started
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequences::types::Trace;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    fn seq(traces: Vec<Trace>) -> Sequence {
        Sequence::new("ctx", "delivery", "demo", "carts", at(0)).with_traces(traces)
    }

    #[test]
    fn test_no_traces_is_waiting() {
        assert_eq!(derive_status(&seq(vec![])), SequenceStatus::Waiting);
    }

    #[test]
    fn test_in_progress_is_started() {
        let s = seq(vec![
            Trace::new("1", "dev", "sh.keptn.event.dev.delivery.triggered", at(1)),
            Trace::new("2", "dev", "sh.keptn.event.deployment.started", at(2)),
        ]);
        assert_eq!(derive_status(&s), SequenceStatus::Started);
        assert!(!s.is_finished());
    }

    #[test]
    fn test_failed_task_fails_sequence() {
        let s = seq(vec![
            Trace::new("1", "dev", "sh.keptn.event.dev.delivery.triggered", at(1)),
            Trace::new("2", "dev", "sh.keptn.event.deployment.finished", at(2))
                .with_result(TraceResult::Fail),
        ]);
        assert_eq!(derive_status(&s), SequenceStatus::Failed);
        assert!(s.is_finished());
    }

    #[test]
    fn test_sequence_finished_event_succeeds() {
        let s = seq(vec![
            Trace::new("1", "dev", "sh.keptn.event.dev.delivery.triggered", at(1)),
            Trace::new("2", "dev", "sh.keptn.event.dev.delivery.finished", at(3))
                .with_result(TraceResult::Pass),
        ]);
        assert_eq!(derive_status(&s), SequenceStatus::Succeeded);
        assert!(s.is_finished());
    }

    #[test]
    fn test_latest_is_chosen_by_time_not_position() {
        let s = seq(vec![
            Trace::new("2", "dev", "sh.keptn.event.dev.delivery.finished", at(3))
                .with_result(TraceResult::Pass),
            Trace::new("1", "dev", "sh.keptn.event.dev.delivery.triggered", at(1)),
        ]);
        assert_eq!(derive_status(&s), SequenceStatus::Succeeded);
    }

    #[test]
    fn test_open_approval_is_waiting() {
        let s = seq(vec![
            Trace::new("1", "prod", "sh.keptn.event.prod.delivery.triggered", at(1)),
            Trace::new("2", "prod", "sh.keptn.event.approval.triggered", at(2)),
        ]);
        assert_eq!(derive_status(&s), SequenceStatus::Waiting);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("FAILED".parse::<SequenceStatus>(), Ok(SequenceStatus::Failed));
        assert!("unknown".parse::<SequenceStatus>().is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&SequenceStatus::Succeeded).unwrap();
        assert_eq!(json, "\"succeeded\"");
    }
}
