//! Prompt builders, one per analysis task.
//!
//! Every builder is a pure function of the intake (plus, for the growth plan,
//! the two prerequisite records). Blank intake fields are replaced with a
//! placeholder so the model never sees an empty section.

use sbos_common::{IntakeRecord, TaskKind};
use serde_json::Value;

use crate::util::{join_or, or_fallback};

const NOT_PROVIDED: &str = "Not provided";
const NOT_SPECIFIED: &str = "Not specified";

const JSON_ONLY: &str =
    "RESPOND WITH ONLY VALID JSON (no markdown, no code fences) matching this exact schema:";

/// Opening sentence of each task's prompt.
const OPENERS: [(TaskKind, &str); 5] = [
    (TaskKind::Diagnostic, "You are a business operations analyst."),
    (TaskKind::MoneyLeaks, "You are a cost optimization specialist."),
    (TaskKind::SopBuilder, "You are an operations consultant"),
    (TaskKind::LeadAutomation, "You are a sales automation specialist."),
    (TaskKind::GrowthPlan, "You are a business growth strategist."),
];

/// The task a built prompt belongs to, recognized by its opening sentence.
pub fn task_for_prompt(prompt: &str) -> Option<TaskKind> {
    let prompt = prompt.trim_start();
    OPENERS
        .iter()
        .find(|(_, opener)| prompt.starts_with(opener))
        .map(|(task, _)| *task)
}

/// Prerequisite records the growth plan is built from.
#[derive(Debug, Clone, Copy)]
pub struct GrowthContext<'a> {
    pub diagnostic: &'a Value,
    pub money_leaks: &'a Value,
}

/// Prompts for every phase-one task, in launch order.
pub fn phase_one_prompts(intake: &IntakeRecord) -> Vec<(TaskKind, String)> {
    vec![
        (TaskKind::Diagnostic, diagnostic_prompt(intake)),
        (TaskKind::MoneyLeaks, money_leaks_prompt(intake)),
        (TaskKind::SopBuilder, sop_builder_prompt(intake)),
        (TaskKind::LeadAutomation, lead_automation_prompt(intake)),
    ]
}

/// Prompt for any task; `None` for the growth plan when `context` is missing.
pub fn prompt_for(
    kind: TaskKind,
    intake: &IntakeRecord,
    context: Option<GrowthContext<'_>>,
) -> Option<String> {
    match kind {
        TaskKind::Diagnostic => Some(diagnostic_prompt(intake)),
        TaskKind::MoneyLeaks => Some(money_leaks_prompt(intake)),
        TaskKind::SopBuilder => Some(sop_builder_prompt(intake)),
        TaskKind::LeadAutomation => Some(lead_automation_prompt(intake)),
        TaskKind::GrowthPlan => {
            context.map(|ctx| growth_plan_prompt(intake, ctx.diagnostic, ctx.money_leaks))
        }
    }
}

/// Non-blank processes, numbered from 1 and joined by `separator`.
///
/// Without a label lines read `1. text`; with one they read `Process 1: text`.
fn numbered_processes(intake: &IntakeRecord, label: &str, separator: &str) -> String {
    let marker = if label.is_empty() { "." } else { ":" };
    let lines: Vec<String> = intake
        .described_processes()
        .enumerate()
        .map(|(i, p)| format!("{}{}{} {}", label, i + 1, marker, p))
        .collect();
    if lines.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        lines.join(separator)
    }
}

pub fn diagnostic_prompt(intake: &IntakeRecord) -> String {
    format!(
        "You are a business operations analyst. Analyze this small business and produce a comprehensive health diagnostic.

BUSINESS DATA:
- Company: {company}
- Team size: {team}
- Revenue range: {revenue}
- Goals: {goals}
- Biggest bottleneck: {bottleneck}

FINANCIAL DATA:
{financial}

TOOLS & SUBSCRIPTIONS:
{tools}

KEY PROCESSES:
{processes}

FOLLOW-UP PROCESS:
{follow_up}

LEAD SOURCES: {lead_sources}

{json_only}
{schema}

Score fairly based on what you see. Be specific in insights: reference their actual tools, processes, and data. Quick wins should include dollar estimates where possible.",
        json_only = JSON_ONLY,
        schema = DIAGNOSTIC_SCHEMA,
        company = intake.company_name,
        team = intake.team_size,
        revenue = intake.revenue_range,
        goals = join_or(&intake.goals, NOT_SPECIFIED),
        bottleneck = or_fallback(&intake.bottleneck, NOT_SPECIFIED),
        financial = or_fallback(&intake.financial_data, NOT_PROVIDED),
        tools = or_fallback(&intake.tool_list, NOT_PROVIDED),
        processes = numbered_processes(intake, "", "\n"),
        follow_up = or_fallback(&intake.follow_up, NOT_PROVIDED),
        lead_sources = join_or(&intake.lead_sources, NOT_SPECIFIED),
    )
}

pub fn money_leaks_prompt(intake: &IntakeRecord) -> String {
    format!(
        "You are a cost optimization specialist. Analyze this business's spending to find waste, duplicates, and savings opportunities.

BUSINESS DATA:
- Company: {company}
- Team size: {team}
- Revenue range: {revenue}

FINANCIAL DATA (every expense/payment):
{financial}

TOOLS & SUBSCRIPTIONS (every tool):
{tools}

INSTRUCTIONS:
1. Identify duplicate tools (two tools doing the same job)
2. Flag underutilized subscriptions
3. Find overlapping features between tools
4. Calculate specific dollar savings for each leak
5. Categorize all spending

{json_only}
{schema}

For \"duplicate\" leaks, include \"tools\" array. For \"underutilized\", include \"tool\", \"monthlyCost\", \"usage\". Always include monthlySavings. Be specific with dollar amounts.",
        json_only = JSON_ONLY,
        schema = MONEY_LEAKS_SCHEMA,
        company = intake.company_name,
        team = intake.team_size,
        revenue = intake.revenue_range,
        financial = or_fallback(&intake.financial_data, NOT_PROVIDED),
        tools = or_fallback(&intake.tool_list, NOT_PROVIDED),
    )
}

pub fn sop_builder_prompt(intake: &IntakeRecord) -> String {
    format!(
        "You are an operations consultant specializing in process documentation. Generate 3 structured Standard Operating Procedures (SOPs) from the business processes described below.

BUSINESS DATA:
- Company: {company}
- Team size: {team}

TOOLS AVAILABLE:
{tools}

PROCESSES DESCRIBED BY USER:
{processes}

INSTRUCTIONS:
1. Generate exactly 3 SOPs from the described processes
2. Each SOP should have 4-6 numbered steps
3. Assign realistic owners (Sales, Operations, Account Manager, Finance, Admin)
4. Reference the actual tools the business uses
5. Include timing expectations for each step
6. Add practical notes where helpful

{json_only}
{schema}",
        json_only = JSON_ONLY,
        schema = SOP_SCHEMA,
        company = intake.company_name,
        team = intake.team_size,
        tools = or_fallback(&intake.tool_list, NOT_PROVIDED),
        processes = numbered_processes(intake, "Process ", "\n\n"),
    )
}

pub fn lead_automation_prompt(intake: &IntakeRecord) -> String {
    format!(
        "You are a sales automation specialist. Design a multi-touch follow-up sequence for this business's lead nurturing.

BUSINESS DATA:
- Company: {company}
- Team size: {team}

LEAD SOURCES: {lead_sources}
PREFERRED CHANNELS: {channels}
COMMUNICATION TONE: {tone}

CURRENT FOLLOW-UP PROCESS:
{follow_up}

PROCESSES (for context on what they sell):
{processes}

TOOLS AVAILABLE:
{tools}

INSTRUCTIONS:
1. Design a 7-touch follow-up sequence over 21 days
2. Mix channels based on preferences (email, sms, phone)
3. Match the requested tone
4. Write actual message content (subject lines + bodies)
5. Use {{{{name}}}} and {{{{company}}}} as merge fields
6. Each touch should have a clear purpose

{json_only}
{schema}",
        json_only = JSON_ONLY,
        schema = LEAD_AUTOMATION_SCHEMA,
        company = intake.company_name,
        team = intake.team_size,
        lead_sources = join_or(&intake.lead_sources, "Website, Referrals"),
        channels = join_or(&intake.channels, "email"),
        tone = or_fallback(&intake.tone, "friendly"),
        follow_up = or_fallback(&intake.follow_up, "Manual follow-up, inconsistent"),
        processes = numbered_processes(intake, "", "\n"),
        tools = or_fallback(&intake.tool_list, NOT_PROVIDED),
    )
}

/// Growth plan prompt; embeds both prerequisite records as pretty JSON.
pub fn growth_plan_prompt(intake: &IntakeRecord, diagnostic: &Value, money_leaks: &Value) -> String {
    format!(
        "You are a business growth strategist. Using the diagnostic scores and money leak findings below, create a prioritized 30/60/90 day operational improvement plan.

BUSINESS DATA:
- Company: {company}
- Team size: {team}
- Revenue range: {revenue}
- Goals: {goals}
- Bottleneck: {bottleneck}

DIAGNOSTIC RESULTS (from Health Diagnostic agent):
{diagnostic:#}

MONEY LEAK FINDINGS (from Money Leak agent):
{money_leaks:#}

INSTRUCTIONS:
1. Create a 3-phase plan (30, 60, 90 days) that directly addresses the diagnostic findings and money leaks
2. Phase 1 (30 days): Quick wins, stop the bleeding; focus on the most critical issues
3. Phase 2 (60 days): Optimize systems, build processes
4. Phase 3 (90 days): Scale, automate, grow
5. Each priority should reference which diagnostic issue or money leak it addresses
6. 3-4 priorities per phase

{json_only}
{schema}",
        json_only = JSON_ONLY,
        schema = GROWTH_PLAN_SCHEMA,
        company = intake.company_name,
        team = intake.team_size,
        revenue = intake.revenue_range,
        goals = join_or(&intake.goals, NOT_SPECIFIED),
        bottleneck = or_fallback(&intake.bottleneck, NOT_SPECIFIED),
    )
}

// ── Response schemas ──────────────────────────────────────────────────

const DIAGNOSTIC_SCHEMA: &str = r#"{
  "overallScore": <number 0-100>,
  "categories": [
    {
      "name": "Operations",
      "score": <number 0-100>,
      "status": "<stable|at-risk|critical>",
      "insight": "<one sentence insight>"
    },
    {
      "name": "Finance Visibility",
      "score": <number 0-100>,
      "status": "<stable|at-risk|critical>",
      "insight": "<one sentence insight>"
    },
    {
      "name": "Growth Readiness",
      "score": <number 0-100>,
      "status": "<stable|at-risk|critical>",
      "insight": "<one sentence insight>"
    },
    {
      "name": "Process Maturity",
      "score": <number 0-100>,
      "status": "<stable|at-risk|critical>",
      "insight": "<one sentence insight>"
    },
    {
      "name": "Team Alignment",
      "score": <number 0-100>,
      "status": "<stable|at-risk|critical>",
      "insight": "<one sentence insight>"
    }
  ],
  "quickWins": ["<actionable suggestion 1>", "<actionable suggestion 2>", "<actionable suggestion 3>"],
  "risks": ["<identified risk 1>", "<identified risk 2>", "<identified risk 3>"]
}"#;

const MONEY_LEAKS_SCHEMA: &str = r#"{
  "totalMonthlySpend": <number>,
  "potentialSavings": <number>,
  "leaks": [
    {
      "type": "<duplicate|underutilized|overlap>",
      "tools": ["<tool1 ($XX/mo)>", "<tool2 ($XX/mo)>"],
      "tool": "<for underutilized: single tool name>",
      "monthlyCost": <number, for underutilized>,
      "usage": "<for underutilized: usage description>",
      "category": "<category name>",
      "severity": "<critical|high|moderate|low>",
      "recommendation": "<specific action to take>",
      "monthlySavings": <number>
    }
  ],
  "spendByCategory": [
    { "category": "<name>", "amount": <number>, "tools": <count> }
  ]
}"#;

const SOP_SCHEMA: &str = r#"{
  "sops": [
    {
      "title": "<SOP title>",
      "version": "1.0",
      "owner": "<primary owner role>",
      "frequency": "<when this runs, e.g. Per new client, Weekly, Monthly>",
      "estimatedTime": "<e.g. 45 minutes>",
      "steps": [
        {
          "number": 1,
          "action": "<clear action description>",
          "owner": "<role>",
          "timing": "<when this step should happen>",
          "tools": ["<tool1>", "<tool2>"],
          "notes": "<optional practical tip>"
        }
      ]
    }
  ]
}"#;

const LEAD_AUTOMATION_SCHEMA: &str = r#"{
  "sequenceName": "<descriptive sequence name>",
  "totalDuration": "21 days",
  "touches": [
    {
      "day": <number>,
      "channel": "<email|sms|phone>",
      "type": "<welcome|value|nudge|case-study|direct-ask|last-chance|breakup>",
      "subject": "<for email: subject line>",
      "body": "<full message content with {{name}} merge fields>",
      "purpose": "<short purpose description>"
    }
  ],
  "expectedMetrics": {
    "openRate": "<range, e.g. 45-55%>",
    "replyRate": "<range, e.g. 15-22%>",
    "conversionRate": "<range, e.g. 8-12%>"
  }
}"#;

const GROWTH_PLAN_SCHEMA: &str = r#"{
  "thirtyDay": {
    "theme": "<phase theme, e.g. Foundation: Stop the Bleeding>",
    "priorities": [
      {
        "task": "<specific action item>",
        "effort": "<low|medium|high>",
        "impact": "<low|medium|high>",
        "addressesIssue": "<which diagnostic or money leak finding this fixes>",
        "weekTarget": <number 1-4>
      }
    ]
  },
  "sixtyDay": {
    "theme": "<phase theme>",
    "priorities": [...]
  },
  "ninetyDay": {
    "theme": "<phase theme>",
    "priorities": [...]
  }
}"#;
