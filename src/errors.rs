//! Typed error hierarchy for the analysis engine.
//!
//! Three enums cover the three outward-facing seams:
//! - `CompletionError`: a text-completion call failed
//! - `TaskError`: one analysis task could not produce a record
//! - `DeliveryError`: posting results to the delivery webhook or polling its status failed

use std::time::Duration;

use sbos_common::{ContractViolation, TaskKind};
use thiserror::Error;

/// Errors from a single call to the text-completion service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompletionError {
    #[error("Completion client is not configured: {0}")]
    Misconfiguration(String),

    #[error("Completion service rejected credentials (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Completion service quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Completion service rejected the request: {message}")]
    InvalidRequest { message: String },

    #[error("Completion service error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected HTTP {status} from completion service: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Completion request failed: {0}")]
    Transport(String),

    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Completion service returned no text: {0}")]
    EmptyResponse(String),

    #[error("Could not decode completion service response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Map a non-success HTTP status and its body onto an error kind.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = error_message_from_body(body);
        match status {
            400 => CompletionError::InvalidRequest { message },
            401 | 403 => CompletionError::Authentication { status, message },
            429 => CompletionError::QuotaExceeded { message },
            500..=599 => CompletionError::Server { status, message },
            _ => CompletionError::UnexpectedStatus { status, message },
        }
    }
}

/// Prefer the service's `{"error": {"message": ..}}` text over the raw body.
fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| crate::util::excerpt(body.trim(), 200))
}

/// Errors from running one analysis task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Refusing to run {task} with an empty prompt")]
    EmptyPrompt { task: TaskKind },

    #[error("{task} completion failed: {source}")]
    CompletionFailure {
        task: TaskKind,
        #[source]
        source: CompletionError,
    },

    #[error("Invalid JSON from completion service for {task} ({reason}). Raw response: {excerpt}")]
    ParseFailure {
        task: TaskKind,
        reason: String,
        excerpt: String,
    },

    #[error("{task} output broke its contract: {source}")]
    SchemaViolation {
        task: TaskKind,
        #[source]
        source: ContractViolation,
    },
}

impl TaskError {
    pub fn task(&self) -> TaskKind {
        match self {
            TaskError::EmptyPrompt { task }
            | TaskError::CompletionFailure { task, .. }
            | TaskError::ParseFailure { task, .. }
            | TaskError::SchemaViolation { task, .. } => *task,
        }
    }
}

/// Errors from the results delivery webhook.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Webhook URL not configured")]
    NotConfigured,

    #[error("Status URL not configured")]
    StatusNotConfigured,

    #[error("Webhook POST failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Could not read webhook response: {0}")]
    Body(#[source] reqwest::Error),
}
