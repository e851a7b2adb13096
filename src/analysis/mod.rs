//! Two-phase analysis orchestration.
//!
//! Phase one runs the four independent tasks concurrently and records each
//! outcome the moment it resolves. Once all four have settled, the growth
//! plan runs only if both the diagnostic and the money-leak analysis
//! succeeded; otherwise it is skipped, which is not a failure.
//!
//! Task failures never escape [`AnalysisOrchestrator::run`]. They are
//! recorded in the returned [`AnalysisRunState`] and reported as events.

pub mod events;
pub mod state;

pub use events::AnalysisEvent;
pub use state::{
    AnalysisRunState, FailureKind, RunCompletion, RunSummary, TaskFailure, TaskOutcome, TaskStatus,
};

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use sbos_common::{IntakeRecord, TaskKind};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::completion::CompletionClient;
use crate::errors::TaskError;
use crate::prompts;
use crate::runner::{RunnerConfig, TaskRunner};
use events::EventSink;

/// Schedules the five analysis tasks for one intake.
pub struct AnalysisOrchestrator {
    runner: TaskRunner,
}

impl AnalysisOrchestrator {
    pub fn new(runner: TaskRunner) -> Self {
        Self { runner }
    }

    /// Orchestrator with default runner settings (no timeout, contracts on).
    pub fn with_client(client: Arc<dyn CompletionClient>) -> Self {
        Self::new(TaskRunner::new(client, RunnerConfig::default()))
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    /// Run every task for `intake` without progress events.
    pub async fn run(&self, intake: &IntakeRecord) -> AnalysisRunState {
        self.execute(intake, &EventSink::none()).await
    }

    /// Run every task for `intake`, sending progress to `events`.
    ///
    /// The sender is dropped when the run returns, so a consumer looping on
    /// `recv()` ends after `RunCompleted`.
    pub async fn run_with_events(
        &self,
        intake: &IntakeRecord,
        events: mpsc::Sender<AnalysisEvent>,
    ) -> AnalysisRunState {
        self.execute(intake, &EventSink::new(events)).await
    }

    async fn execute(&self, intake: &IntakeRecord, sink: &EventSink) -> AnalysisRunState {
        let mut state = AnalysisRunState::new();
        info!(
            run_id = %state.run_id,
            company = %intake.company_name,
            "Starting analysis run"
        );
        sink.emit(AnalysisEvent::RunStarted {
            run_id: state.run_id,
            company: intake.company_name.clone(),
        })
        .await;

        self.run_phase_one(intake, &mut state, sink).await;
        self.run_phase_two(intake, &mut state, sink).await;

        state.finish();
        let summary = state.summary();
        info!(
            run_id = %state.run_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            duration_ms = summary.duration_ms.unwrap_or_default(),
            "Analysis run finished"
        );
        sink.emit(AnalysisEvent::RunCompleted { summary }).await;
        state
    }

    /// Launch the independent tasks together and settle each as it resolves.
    async fn run_phase_one(&self, intake: &IntakeRecord, state: &mut AnalysisRunState, sink: &EventSink) {
        let prompts = prompts::phase_one_prompts(intake);
        sink.emit(AnalysisEvent::PhaseStarted {
            phase: 1,
            tasks: prompts.iter().map(|(task, _)| *task).collect(),
        })
        .await;

        let runner = &self.runner;
        let mut in_flight = FuturesUnordered::new();
        for (task, prompt) in prompts {
            sink.emit(AnalysisEvent::TaskStarted { task }).await;
            in_flight.push(async move {
                let result = runner.run(task, &prompt).await;
                (task, result)
            });
        }

        while let Some((task, result)) = in_flight.next().await {
            self.settle(state, task, result, sink).await;
        }
        debug!(run_id = %state.run_id, "Phase one settled");
    }

    /// Run the growth plan if its prerequisites succeeded, otherwise skip it.
    async fn run_phase_two(&self, intake: &IntakeRecord, state: &mut AnalysisRunState, sink: &EventSink) {
        let task = TaskKind::GrowthPlan;
        let prompt = match (
            state.record(TaskKind::Diagnostic),
            state.record(TaskKind::MoneyLeaks),
        ) {
            (Some(diagnostic), Some(money_leaks)) => {
                Some(prompts::growth_plan_prompt(intake, diagnostic, money_leaks))
            }
            _ => None,
        };

        let Some(prompt) = prompt else {
            let missing = state.unmet_prerequisites(task);
            let ids: Vec<&str> = missing.iter().map(|t| t.id()).collect();
            info!(
                task = %task,
                missing = %ids.join(", "),
                "Skipping growth plan; prerequisites did not succeed"
            );
            state.mark_skipped(task);
            sink.emit(AnalysisEvent::GrowthPlanSkipped { missing }).await;
            return;
        };

        sink.emit(AnalysisEvent::PhaseStarted {
            phase: 2,
            tasks: vec![task],
        })
        .await;
        sink.emit(AnalysisEvent::TaskStarted { task }).await;
        let result = self.runner.run(task, &prompt).await;
        self.settle(state, task, result, sink).await;
    }

    /// Record a task's result and report it.
    async fn settle(
        &self,
        state: &mut AnalysisRunState,
        task: TaskKind,
        result: Result<Value, TaskError>,
        sink: &EventSink,
    ) {
        let outcome = match result {
            Ok(record) => {
                info!(task = %task, "Task succeeded");
                TaskOutcome::Succeeded { record }
            }
            Err(err) => {
                warn!(task = %task, error = %err, "Task failed");
                TaskOutcome::Failed {
                    failure: TaskFailure::from(&err),
                }
            }
        };

        if !state.record_outcome(task, outcome.clone()) {
            warn!(task = %task, "Ignoring second outcome for an already resolved task");
            return;
        }

        let event = match outcome {
            TaskOutcome::Succeeded { record } => AnalysisEvent::TaskCompleted { task, record },
            TaskOutcome::Failed { failure } => AnalysisEvent::TaskFailed { task, failure },
        };
        sink.emit(event).await;
    }
}
