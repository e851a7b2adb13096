//! Text-completion service boundary.
//!
//! The analysis engine only needs "prompt in, text out". Everything that
//! talks to a model does so through [`CompletionClient`], which is
//! constructed by the caller and injected; there is no process-wide client.

pub mod gemini;
pub mod offline;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use crate::errors::CompletionError;
pub use gemini::GeminiClient;
pub use offline::SampleClient;

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// One request to the completion service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<ChatTurn>,
}

impl CompletionRequest {
    /// A one-shot request: a single user turn, no system instruction.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            turns: vec![ChatTurn::user(text)],
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Text of the most recent user turn.
    pub fn last_user_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.text.as_str())
    }
}

/// Abstraction over the text-completion service for testability.
///
/// Real implementation: [`GeminiClient`]. Offline demo: [`SampleClient`].
/// Test double: scripted clients in unit and integration tests.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Provider name for log fields.
    fn name(&self) -> &str;

    /// Send one request and return the raw response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_request_has_single_user_turn() {
        let request = CompletionRequest::prompt("Analyze this");
        assert_eq!(request.turns, vec![ChatTurn::user("Analyze this")]);
        assert!(request.system_instruction.is_none());
        assert_eq!(request.last_user_text(), Some("Analyze this"));
    }

    #[test]
    fn test_last_user_text_skips_model_turns() {
        let request = CompletionRequest {
            system_instruction: Some("Be brief".to_string()),
            turns: vec![
                ChatTurn::user("first"),
                ChatTurn::model("reply"),
                ChatTurn::user("second"),
                ChatTurn::model("another reply"),
            ],
        };
        assert_eq!(request.last_user_text(), Some("second"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
    }
}
