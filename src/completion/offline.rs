//! Offline completion client answering from bundled sample records.
//!
//! Lets `sbos analyze --offline` walk the whole pipeline (prompts, parsing,
//! contracts, events) without an API key. Replies are the Acme Local Services
//! demo results, whatever the intake says.

use async_trait::async_trait;
use sbos_common::TaskKind;
use tracing::debug;

use super::{CompletionClient, CompletionError, CompletionRequest};
use crate::prompts::task_for_prompt;

/// Canned record for `task`, as the service would return it.
pub fn sample_reply(task: TaskKind) -> &'static str {
    match task {
        TaskKind::Diagnostic => include_str!("samples/diagnostic.json"),
        TaskKind::MoneyLeaks => include_str!("samples/money-leaks.json"),
        TaskKind::SopBuilder => include_str!("samples/sop-builder.json"),
        TaskKind::LeadAutomation => include_str!("samples/lead-automation.json"),
        TaskKind::GrowthPlan => include_str!("samples/growth-plan.json"),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SampleClient;

impl SampleClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CompletionClient for SampleClient {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let prompt = request.last_user_text().unwrap_or_default();
        let task = task_for_prompt(prompt).ok_or_else(|| CompletionError::InvalidRequest {
            message: "offline mode only answers analysis prompts".to_string(),
        })?;
        debug!(task = %task, "Answering from bundled sample");
        Ok(sample_reply(task).to_string())
    }
}
