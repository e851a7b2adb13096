//! Business assistant chat grounded in the intake and analysis results.

use std::sync::Arc;

use sbos_common::{IntakeRecord, TaskKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::AnalysisRunState;
use crate::completion::{ChatTurn, CompletionClient, CompletionError, CompletionRequest};

pub const FALLBACK_REPLY: &str = "I wasn't able to generate a response. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    fn to_turn(&self) -> ChatTurn {
        match self.role {
            ChatRole::User => ChatTurn::user(&self.content),
            ChatRole::Assistant => ChatTurn::model(&self.content),
        }
    }
}

/// Section headings for analysis records, in the order they are shown.
const RESULT_SECTIONS: [(TaskKind, &str); 5] = [
    (TaskKind::Diagnostic, "HEALTH DIAGNOSTIC RESULTS"),
    (TaskKind::MoneyLeaks, "MONEY LEAK FINDINGS"),
    (TaskKind::GrowthPlan, "GROWTH PLAN"),
    (TaskKind::SopBuilder, "SOP TEMPLATES"),
    (TaskKind::LeadAutomation, "LEAD AUTOMATION SEQUENCE"),
];

/// System instruction describing the business and any succeeded records.
pub fn assistant_system_prompt(intake: &IntakeRecord, results: Option<&AnalysisRunState>) -> String {
    let company = if intake.company_name.trim().is_empty() {
        "this business"
    } else {
        intake.company_name.as_str()
    };

    let mut parts: Vec<String> = vec![
        format!(
            "You are the SBOS AI Assistant, a helpful, knowledgeable business advisor for {}.",
            company
        ),
        "You have full access to the user's business data and analysis results. Answer questions clearly and specifically, referencing their actual data. Be concise but actionable. Use plain English.".to_string(),
        "If asked about something not covered by the data, say so honestly. Don't make up numbers.".to_string(),
        "Keep responses focused, 2-4 paragraphs max unless they ask for detail. Use bullet points for lists.".to_string(),
        String::new(),
        "=== BUSINESS PROFILE ===".to_string(),
    ];

    if !intake.company_name.trim().is_empty() {
        parts.push(format!("Company: {}", intake.company_name));
    }
    if intake.team_size > 0 {
        parts.push(format!("Team size: {}", intake.team_size));
    }
    if !intake.revenue_range.trim().is_empty() {
        parts.push(format!("Revenue range: {}", intake.revenue_range));
    }
    if !intake.goals.is_empty() {
        parts.push(format!("Goals: {}", intake.goals.join(", ")));
    }
    if !intake.bottleneck.trim().is_empty() {
        parts.push(format!("Biggest bottleneck: {}", intake.bottleneck));
    }
    parts.push(String::new());

    let mut section = |heading: &str, body: String| {
        parts.push(format!("=== {} ===", heading));
        parts.push(body);
        parts.push(String::new());
    };

    if !intake.financial_data.trim().is_empty() {
        section("FINANCIAL DATA", intake.financial_data.clone());
    }
    if !intake.tool_list.trim().is_empty() {
        section("TOOLS & SUBSCRIPTIONS", intake.tool_list.clone());
    }
    let processes: Vec<String> = intake
        .described_processes()
        .enumerate()
        .map(|(i, p)| format!("{}. {}", i + 1, p))
        .collect();
    if !processes.is_empty() {
        section("KEY PROCESSES", processes.join("\n"));
    }
    if !intake.follow_up.trim().is_empty() {
        section("CURRENT FOLLOW-UP PROCESS", intake.follow_up.clone());
    }

    if let Some(results) = results {
        for (task, heading) in RESULT_SECTIONS {
            if let Some(record) = results.record(task) {
                section(heading, format!("{:#}", record));
            }
        }
    }

    parts.join("\n")
}

/// Answers questions about one business through a completion client.
pub struct BusinessAssistant {
    client: Arc<dyn CompletionClient>,
}

impl BusinessAssistant {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Reply to `message` given the prior conversation.
    ///
    /// An empty reply from the service becomes [`FALLBACK_REPLY`]; other
    /// service errors are returned.
    pub async fn reply(
        &self,
        message: &str,
        history: &[ChatMessage],
        intake: &IntakeRecord,
        results: Option<&AnalysisRunState>,
    ) -> Result<String, CompletionError> {
        let mut turns: Vec<ChatTurn> = history.iter().map(ChatMessage::to_turn).collect();
        turns.push(ChatTurn::user(message));

        let request = CompletionRequest {
            system_instruction: Some(assistant_system_prompt(intake, results)),
            turns,
        };
        debug!(history = history.len(), "Sending assistant chat request");

        match self.client.complete(request).await {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) | Err(CompletionError::EmptyResponse(_)) => Ok(FALLBACK_REPLY.to_string()),
            Err(e) => Err(e),
        }
    }
}
