use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DisplayRef, Phase, ProcessingStatus, RunId};

/// Phased progress reported by an analysis backend to the workflow driving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PhaseProgress {
    PhaseStarted { phase: Phase },
    Step { phase: Phase, percent: u8 },
}

/// Everything an observer of a processing run can see, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WorkflowEvent {
    RunStarted {
        run_id: RunId,
        file_name: String,
        staged_count: usize,
        started_at: DateTime<Utc>,
    },
    StatusChanged {
        run_id: RunId,
        status: ProcessingStatus,
        progress: u8,
    },
    Progress {
        run_id: RunId,
        status: ProcessingStatus,
        progress: u8,
    },
    Completed {
        run_id: RunId,
        result_ref: DisplayRef,
    },
    Failed {
        run_id: RunId,
        reason: String,
    },
    Closed {
        run_id: RunId,
    },
}

impl WorkflowEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            WorkflowEvent::RunStarted { run_id, .. }
            | WorkflowEvent::StatusChanged { run_id, .. }
            | WorkflowEvent::Progress { run_id, .. }
            | WorkflowEvent::Completed { run_id, .. }
            | WorkflowEvent::Failed { run_id, .. }
            | WorkflowEvent::Closed { run_id } => *run_id,
        }
    }
}
