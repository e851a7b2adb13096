//! Single-task execution against the completion service.
//!
//! A run is exactly one completion call. The reply may be wrapped in Markdown
//! code fences; those are stripped and the rest must be a JSON object. There
//! is no retry and no attempt to dig JSON out of surrounding prose.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sbos_common::{TaskKind, contracts};
use serde_json::Value;
use tracing::{debug, warn};

use crate::completion::{CompletionClient, CompletionError, CompletionRequest};
use crate::errors::TaskError;
use crate::util::{excerpt, strip_code_fences};

pub const DEFAULT_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Per-call limit; `None` waits as long as the service takes.
    pub request_timeout: Option<Duration>,
    /// Check parsed records against their typed contract.
    pub enforce_contracts: bool,
    /// Characters of raw output kept in a [`TaskError::ParseFailure`].
    pub excerpt_chars: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            request_timeout: None,
            enforce_contracts: true,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

impl RunnerConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_contracts(mut self, enforce: bool) -> Self {
        self.enforce_contracts = enforce;
        self
    }
}

/// Runs one analysis task at a time through an injected completion client.
#[derive(Clone)]
pub struct TaskRunner {
    client: Arc<dyn CompletionClient>,
    config: RunnerConfig,
}

impl TaskRunner {
    pub fn new(client: Arc<dyn CompletionClient>, config: RunnerConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run `task` with `prompt` and return its parsed record.
    pub async fn run(&self, task: TaskKind, prompt: &str) -> Result<Value, TaskError> {
        if prompt.trim().is_empty() {
            return Err(TaskError::EmptyPrompt { task });
        }

        let started = Instant::now();
        debug!(
            task = %task,
            provider = self.client.name(),
            prompt_chars = prompt.len(),
            "Sending completion request"
        );

        let raw = self
            .complete(prompt)
            .await
            .map_err(|source| TaskError::CompletionFailure { task, source })?;

        let record = self.parse_record(task, &raw)?;

        if self.config.enforce_contracts {
            let typed = contracts::validate(task, &record)
                .map_err(|source| TaskError::SchemaViolation { task, source })?;
            for lint in typed.lint() {
                warn!(task = %task, lint = %lint, "Task record has a quality problem");
            }
        }

        debug!(
            task = %task,
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_chars = raw.len(),
            "Task record parsed"
        );
        Ok(record)
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = CompletionRequest::prompt(prompt);
        match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.client.complete(request))
                .await
                .map_err(|_| CompletionError::Timeout(limit))?,
            None => self.client.complete(request).await,
        }
    }

    fn parse_record(&self, task: TaskKind, raw: &str) -> Result<Value, TaskError> {
        let cleaned = strip_code_fences(raw);
        let parse_failure = |reason: String| {
            warn!(task = %task, reason = %reason, "Completion output is not a JSON object");
            TaskError::ParseFailure {
                task,
                reason,
                excerpt: excerpt(raw, self.config.excerpt_chars),
            }
        };

        match serde_json::from_str::<Value>(&cleaned) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(other) => Err(parse_failure(format!(
                "expected a JSON object, found {}",
                json_type_name(&other)
            ))),
            Err(e) => Err(parse_failure(e.to_string())),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
