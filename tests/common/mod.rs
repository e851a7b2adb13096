//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sbos::TaskKind;
use sbos::analysis::{AnalysisEvent, AnalysisOrchestrator, AnalysisRunState};
use sbos::completion::{CompletionClient, CompletionError, CompletionRequest};
use sbos::IntakeRecord;
use serde_json::{Value, json};
use tokio::sync::mpsc;

/// Opening sentence of each task prompt, used to tell requests apart.
const PROMPT_OPENERS: [(&str, TaskKind); 5] = [
    ("You are a business operations analyst.", TaskKind::Diagnostic),
    ("You are a cost optimization specialist.", TaskKind::MoneyLeaks),
    ("You are an operations consultant", TaskKind::SopBuilder),
    ("You are a sales automation specialist.", TaskKind::LeadAutomation),
    ("You are a business growth strategist.", TaskKind::GrowthPlan),
];

pub fn classify(prompt: &str) -> Option<TaskKind> {
    PROMPT_OPENERS
        .iter()
        .find(|(opener, _)| prompt.starts_with(opener))
        .map(|(_, task)| *task)
}

#[derive(Debug, Clone)]
struct Script {
    reply: Result<String, CompletionError>,
    delay: Duration,
}

/// Completion client answering each task from a per-task script.
///
/// Unscripted tasks get a valid record. Every call is recorded, as is the
/// highest number of calls in flight at once.
pub struct ScriptedCompletionClient {
    scripts: HashMap<TaskKind, Script>,
    calls: Mutex<Vec<TaskKind>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for ScriptedCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCompletionClient {
    pub fn new() -> Self {
        let scripts = TaskKind::ALL
            .into_iter()
            .map(|task| {
                (
                    task,
                    Script {
                        reply: Ok(valid_record(task).to_string()),
                        delay: Duration::ZERO,
                    },
                )
            })
            .collect();
        Self {
            scripts,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn reply(mut self, task: TaskKind, text: impl Into<String>) -> Self {
        self.script_mut(task).reply = Ok(text.into());
        self
    }

    pub fn fail(mut self, task: TaskKind, err: CompletionError) -> Self {
        self.script_mut(task).reply = Err(err);
        self
    }

    pub fn delay(mut self, task: TaskKind, delay: Duration) -> Self {
        self.script_mut(task).delay = delay;
        self
    }

    fn script_mut(&mut self, task: TaskKind) -> &mut Script {
        self.scripts.entry(task).or_insert_with(|| Script {
            reply: Ok(valid_record(task).to_string()),
            delay: Duration::ZERO,
        })
    }

    pub fn calls(&self) -> Vec<TaskKind> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, task: TaskKind) -> usize {
        self.calls().iter().filter(|t| **t == task).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let prompt = request.last_user_text().unwrap_or_default();
        let Some(task) = classify(prompt) else {
            return Err(CompletionError::InvalidRequest {
                message: "unrecognized prompt".to_string(),
            });
        };
        self.calls.lock().unwrap().push(task);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self.scripts[&task].clone();
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        script.reply
    }
}

/// Run `orchestrator` and collect every event it emitted.
pub async fn run_collecting(
    orchestrator: &AnalysisOrchestrator,
    intake: &IntakeRecord,
) -> (AnalysisRunState, Vec<AnalysisEvent>) {
    let (tx, mut rx) = mpsc::channel(8);
    let collect = async {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    };
    tokio::join!(orchestrator.run_with_events(intake, tx), collect)
}

/// Index of the first event matching `pred`.
pub fn position(events: &[AnalysisEvent], pred: impl Fn(&AnalysisEvent) -> bool) -> Option<usize> {
    events.iter().position(pred)
}

pub fn completed_index(events: &[AnalysisEvent], task: TaskKind) -> Option<usize> {
    position(events, |e| matches!(e, AnalysisEvent::TaskCompleted { task: t, .. } if *t == task))
}

/// Index of the success or failure event for `task`.
pub fn settled_index(events: &[AnalysisEvent], task: TaskKind) -> Option<usize> {
    position(events, |e| {
        matches!(
            e,
            AnalysisEvent::TaskCompleted { task: t, .. } | AnalysisEvent::TaskFailed { task: t, .. }
                if *t == task
        )
    })
}

// =============================================================================
// Valid records
// =============================================================================

pub fn valid_record(task: TaskKind) -> Value {
    match task {
        TaskKind::Diagnostic => diagnostic_record(),
        TaskKind::MoneyLeaks => money_leaks_record(),
        TaskKind::SopBuilder => sop_record(),
        TaskKind::LeadAutomation => lead_automation_record(),
        TaskKind::GrowthPlan => growth_plan_record(),
    }
}

pub fn diagnostic_record() -> Value {
    json!({
        "overallScore": 72,
        "categories": [
            {"name": "Operations", "score": 64, "status": "at-risk", "insight": "Onboarding depends on the owner."},
            {"name": "Sales & Marketing", "score": 70, "status": "stable", "insight": "Referrals drive most leads."},
            {"name": "Financial Health", "score": 81, "status": "stable", "insight": "Margins are healthy."},
            {"name": "Team & Culture", "score": 75, "status": "stable", "insight": "Small team, clear roles."},
            {"name": "Technology", "score": 58, "status": "critical", "insight": "Overlapping tools."}
        ],
        "quickWins": ["Cancel the unused Asana seats", "Template the onboarding email"],
        "risks": ["Owner is a single point of failure"]
    })
}

pub fn money_leaks_record() -> Value {
    json!({
        "totalMonthlySpend": 1843,
        "potentialSavings": 450,
        "leaks": [
            {
                "type": "duplicate",
                "severity": "high",
                "tools": ["Asana", "Monday.com"],
                "monthlySavings": 300,
                "recommendation": "Keep Monday.com"
            },
            {
                "type": "underutilized",
                "severity": "moderate",
                "tool": "Zoom Pro",
                "monthlyCost": 150,
                "usage": "2 meetings a month",
                "monthlySavings": 150,
                "recommendation": "Downgrade to the free tier"
            }
        ],
        "spendByCategory": [
            {"category": "Project Management", "amount": 600, "tools": 2},
            {"category": "Communication", "amount": 294, "tools": 2}
        ]
    })
}

pub fn sop_record() -> Value {
    let sop = |title: &str| {
        json!({
            "title": title,
            "version": "1.0",
            "owner": "Operations Manager",
            "frequency": "Per new client",
            "estimatedTime": "45 minutes",
            "steps": [
                {"number": 1, "action": "Send welcome email", "owner": "Office Admin", "timing": "Day 0", "tools": ["Gmail"]},
                {"number": 2, "action": "Schedule kickoff call", "owner": "Account Lead", "timing": "Day 1", "tools": ["Calendly"], "notes": "Offer two slots"}
            ]
        })
    };
    json!({"sops": [sop("New Client Onboarding"), sop("Invoice Collection"), sop("Job Scheduling")]})
}

pub fn lead_automation_record() -> Value {
    let touches: Vec<Value> = [0, 1, 3, 5, 7, 10, 14]
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let channel = if i % 3 == 1 { "sms" } else { "email" };
            json!({
                "day": day,
                "channel": channel,
                "type": "follow-up",
                "subject": format!("Touch {}", i + 1),
                "body": format!("Hi {{{{first_name}}}}, following up ({}).", i + 1),
                "purpose": "Keep the conversation going"
            })
        })
        .collect();
    json!({
        "sequenceName": "New Lead Nurture",
        "totalDuration": "14 days",
        "touches": touches,
        "expectedMetrics": {"openRate": "45%", "replyRate": "12%", "conversionRate": "5%"}
    })
}

pub fn growth_plan_record() -> Value {
    let phase = |theme: &str, week: u32| {
        json!({
            "theme": theme,
            "priorities": [{
                "task": "Consolidate project tools",
                "effort": "low",
                "impact": "high",
                "addressesIssue": "Duplicate project management spend",
                "weekTarget": week
            }]
        })
    };
    json!({
        "thirtyDay": phase("Stop the leaks", 2),
        "sixtyDay": phase("Systemize onboarding", 6),
        "ninetyDay": phase("Automate follow-up", 11)
    })
}
