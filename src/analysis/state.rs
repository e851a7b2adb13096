//! Outcome tracking for one analysis run.
//!
//! Each task id moves through at most one transition per run:
//! `pending → succeeded`, `pending → failed`, or (for tasks with
//! prerequisites) `pending → skipped`. Slots are write-once; a second write
//! for the same task is refused rather than overwriting the first.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use sbos_common::TaskKind;
use sbos_common::contracts::Contract;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::TaskError;

/// Status of one task within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet resolved
    Pending,
    /// Produced a parsed record
    Succeeded,
    /// Attempted and failed
    Failed,
    /// Never attempted because a prerequisite did not succeed
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Broad category of a task failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The prompt was empty
    InvalidPrompt,
    /// The completion service call failed
    Completion,
    /// The reply was not a JSON object
    Parse,
    /// The reply was JSON but broke the task contract
    SchemaViolation,
}

/// Serializable snapshot of a [`TaskError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Leading characters of the raw reply, for parse failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl From<&TaskError> for TaskFailure {
    fn from(err: &TaskError) -> Self {
        let (kind, excerpt) = match err {
            TaskError::EmptyPrompt { .. } => (FailureKind::InvalidPrompt, None),
            TaskError::CompletionFailure { .. } => (FailureKind::Completion, None),
            TaskError::ParseFailure { excerpt, .. } => (FailureKind::Parse, Some(excerpt.clone())),
            TaskError::SchemaViolation { .. } => (FailureKind::SchemaViolation, None),
        };
        Self {
            kind,
            message: err.to_string(),
            excerpt,
        }
    }
}

/// Terminal result of an attempted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Succeeded { record: Value },
    Failed { failure: TaskFailure },
}

impl TaskOutcome {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskOutcome::Succeeded { .. } => TaskStatus::Succeeded,
            TaskOutcome::Failed { .. } => TaskStatus::Failed,
        }
    }

    pub fn record(&self) -> Option<&Value> {
        match self {
            TaskOutcome::Succeeded { record } => Some(record),
            TaskOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            TaskOutcome::Failed { failure } => Some(failure),
            TaskOutcome::Succeeded { .. } => None,
        }
    }
}

/// How a run ended, from the consumer's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunCompletion {
    /// At least one task has not resolved yet
    InProgress,
    /// All five tasks succeeded
    AllSucceeded,
    /// Phase one settled and the growth plan was skipped
    GrowthPlanSkipped { failed: Vec<TaskKind> },
    /// Every attempted task resolved, some of them failed
    CompletedWithFailures { failed: Vec<TaskKind> },
}

/// Counts across a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl RunSummary {
    pub fn all_success(&self) -> bool {
        self.failed == 0 && self.skipped == 0 && self.succeeded == self.total
    }

    pub fn completion_percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / self.total as f64) * 100.0
    }
}

/// Everything one orchestrator invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRunState {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    outcomes: BTreeMap<TaskKind, TaskOutcome>,
    #[serde(default)]
    skipped: BTreeSet<TaskKind>,
}

impl Default for AnalysisRunState {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisRunState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            outcomes: BTreeMap::new(),
            skipped: BTreeSet::new(),
        }
    }

    /// Record the outcome for `task`. Returns `false` if its slot is taken.
    pub fn record_outcome(&mut self, task: TaskKind, outcome: TaskOutcome) -> bool {
        if self.skipped.contains(&task) {
            return false;
        }
        match self.outcomes.entry(task) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(outcome);
                true
            }
        }
    }

    /// Mark `task` as never attempted. Returns `false` if it already resolved.
    pub fn mark_skipped(&mut self, task: TaskKind) -> bool {
        if self.outcomes.contains_key(&task) {
            return false;
        }
        self.skipped.insert(task)
    }

    pub fn finish(&mut self) {
        self.finished_at.get_or_insert_with(Utc::now);
    }

    pub fn status(&self, task: TaskKind) -> TaskStatus {
        match self.outcomes.get(&task) {
            Some(outcome) => outcome.status(),
            None if self.skipped.contains(&task) => TaskStatus::Skipped,
            None => TaskStatus::Pending,
        }
    }

    pub fn outcome(&self, task: TaskKind) -> Option<&TaskOutcome> {
        self.outcomes.get(&task)
    }

    /// Parsed record for `task`, if it succeeded.
    pub fn record(&self, task: TaskKind) -> Option<&Value> {
        self.outcomes.get(&task).and_then(TaskOutcome::record)
    }

    /// Succeeded record decoded into its typed contract.
    pub fn decode<C: Contract>(&self) -> Option<C> {
        self.record(C::TASK).and_then(|v| C::decode(v).ok())
    }

    /// Succeeded records in dashboard order.
    pub fn records(&self) -> impl Iterator<Item = (TaskKind, &Value)> {
        TaskKind::ALL
            .into_iter()
            .filter_map(|task| self.record(task).map(|r| (task, r)))
    }

    pub fn failures(&self) -> Vec<(TaskKind, &TaskFailure)> {
        self.outcomes
            .iter()
            .filter_map(|(task, outcome)| outcome.failure().map(|f| (*task, f)))
            .collect()
    }

    pub fn failed_tasks(&self) -> Vec<TaskKind> {
        self.failures().into_iter().map(|(task, _)| task).collect()
    }

    /// Prerequisites of `task` that have not succeeded.
    pub fn unmet_prerequisites(&self, task: TaskKind) -> Vec<TaskKind> {
        task.prerequisites()
            .iter()
            .copied()
            .filter(|p| self.status(*p) != TaskStatus::Succeeded)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        TaskKind::ALL.iter().all(|t| self.status(*t).is_terminal())
    }

    pub fn all_succeeded(&self) -> bool {
        TaskKind::ALL
            .iter()
            .all(|t| self.status(*t) == TaskStatus::Succeeded)
    }

    pub fn growth_plan_skipped(&self) -> bool {
        self.status(TaskKind::GrowthPlan) == TaskStatus::Skipped
    }

    pub fn completion(&self) -> RunCompletion {
        if !self.is_complete() {
            return RunCompletion::InProgress;
        }
        if self.all_succeeded() {
            return RunCompletion::AllSucceeded;
        }
        let failed = self.failed_tasks();
        if self.growth_plan_skipped() {
            RunCompletion::GrowthPlanSkipped { failed }
        } else {
            RunCompletion::CompletedWithFailures { failed }
        }
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: TaskKind::ALL.len(),
            duration_ms: self
                .finished_at
                .map(|end| (end - self.started_at).num_milliseconds().max(0) as u64),
            ..Default::default()
        };
        for task in TaskKind::ALL {
            match self.status(task) {
                TaskStatus::Pending => summary.pending += 1,
                TaskStatus::Succeeded => summary.succeeded += 1,
                TaskStatus::Failed => summary.failed += 1,
                TaskStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}
