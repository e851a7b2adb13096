//! Progress events emitted while a run executes.

use sbos_common::TaskKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::state::{RunSummary, TaskFailure};

/// Events emitted during an analysis run, in happens-before order.
///
/// `TaskCompleted` fires at most once per task id. Phase-one completions
/// arrive in whatever order the tasks finish; the growth plan's events
/// always follow every phase-one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    RunStarted { run_id: Uuid, company: String },
    PhaseStarted { phase: u8, tasks: Vec<TaskKind> },
    TaskStarted { task: TaskKind },
    TaskCompleted { task: TaskKind, record: Value },
    TaskFailed { task: TaskKind, failure: TaskFailure },
    /// The growth plan will not run; `missing` lists the unmet prerequisites.
    GrowthPlanSkipped { missing: Vec<TaskKind> },
    RunCompleted { summary: RunSummary },
}

impl AnalysisEvent {
    /// The task this event concerns, if any.
    pub fn task(&self) -> Option<TaskKind> {
        match self {
            AnalysisEvent::TaskStarted { task }
            | AnalysisEvent::TaskCompleted { task, .. }
            | AnalysisEvent::TaskFailed { task, .. } => Some(*task),
            AnalysisEvent::GrowthPlanSkipped { .. } => Some(TaskKind::GrowthPlan),
            _ => None,
        }
    }
}

/// Optional sender side of the event channel.
pub(crate) struct EventSink {
    tx: Option<mpsc::Sender<AnalysisEvent>>,
}

impl EventSink {
    pub(crate) fn none() -> Self {
        Self { tx: None }
    }

    pub(crate) fn new(tx: mpsc::Sender<AnalysisEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Send an event; a dropped receiver is not an error.
    pub(crate) async fn emit(&self, event: AnalysisEvent) {
        if let Some(tx) = &self.tx {
            tx.send(event).await.ok();
        }
    }
}
