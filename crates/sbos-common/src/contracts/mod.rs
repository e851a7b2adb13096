//! Typed output contracts for the five analysis tasks.
//!
//! A completion is first parsed as free-form JSON, then decoded into the
//! task's record type here. Decoding catches structural problems (missing
//! fields, wrong types, unknown enum values); [`Contract::check`] covers the
//! count and range rules a type alone cannot express. Unknown extra fields
//! are ignored.
//!
//! [`Contract::lint`] reports softer quality problems such as blank labels or
//! steps out of order. Lints never reject a record.

mod diagnostic;
mod growth_plan;
mod lead_automation;
mod money_leaks;
mod sop;

pub use diagnostic::{CategoryStatus, DiagnosticCategory, DiagnosticReport};
pub use growth_plan::{GrowthPlan, Level, PlanPhase, Priority};
pub use lead_automation::{Channel, ExpectedMetrics, LeadSequence, Touch};
pub use money_leaks::{CategorySpend, Leak, LeakKind, MoneyLeakReport, Severity};
pub use sop::{Sop, SopCollection, SopStep};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::task::TaskKind;

#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("{task} record has the wrong shape: {source}")]
    Shape {
        task: TaskKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{task} record field `{field}` {problem}")]
    Field {
        task: TaskKind,
        field: String,
        problem: String,
    },
}

impl ContractViolation {
    pub fn field(task: TaskKind, field: impl Into<String>, problem: impl Into<String>) -> Self {
        ContractViolation::Field {
            task,
            field: field.into(),
            problem: problem.into(),
        }
    }

    pub fn task(&self) -> TaskKind {
        match self {
            ContractViolation::Shape { task, .. } | ContractViolation::Field { task, .. } => *task,
        }
    }
}

/// A task output record with rules beyond its serde shape.
pub trait Contract: Serialize + DeserializeOwned {
    const TASK: TaskKind;

    fn check(&self) -> Result<(), ContractViolation>;

    /// Quality warnings for a record that already passed [`Contract::check`].
    fn lint(&self) -> Vec<ContractViolation> {
        Vec::new()
    }

    /// Decode a parsed JSON value and apply [`Contract::check`].
    fn decode(value: &Value) -> Result<Self, ContractViolation> {
        let record = Self::deserialize(value).map_err(|source| ContractViolation::Shape {
            task: Self::TASK,
            source,
        })?;
        record.check()?;
        Ok(record)
    }
}

/// A validated task output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskRecord {
    Diagnostic(DiagnosticReport),
    MoneyLeaks(MoneyLeakReport),
    SopBuilder(SopCollection),
    LeadAutomation(LeadSequence),
    GrowthPlan(GrowthPlan),
}

impl TaskRecord {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskRecord::Diagnostic(_) => TaskKind::Diagnostic,
            TaskRecord::MoneyLeaks(_) => TaskKind::MoneyLeaks,
            TaskRecord::SopBuilder(_) => TaskKind::SopBuilder,
            TaskRecord::LeadAutomation(_) => TaskKind::LeadAutomation,
            TaskRecord::GrowthPlan(_) => TaskKind::GrowthPlan,
        }
    }

    pub fn lint(&self) -> Vec<ContractViolation> {
        match self {
            TaskRecord::Diagnostic(r) => r.lint(),
            TaskRecord::MoneyLeaks(r) => r.lint(),
            TaskRecord::SopBuilder(r) => r.lint(),
            TaskRecord::LeadAutomation(r) => r.lint(),
            TaskRecord::GrowthPlan(r) => r.lint(),
        }
    }
}

/// Check `value` against the contract for `kind`.
pub fn validate(kind: TaskKind, value: &Value) -> Result<TaskRecord, ContractViolation> {
    match kind {
        TaskKind::Diagnostic => DiagnosticReport::decode(value).map(TaskRecord::Diagnostic),
        TaskKind::MoneyLeaks => MoneyLeakReport::decode(value).map(TaskRecord::MoneyLeaks),
        TaskKind::SopBuilder => SopCollection::decode(value).map(TaskRecord::SopBuilder),
        TaskKind::LeadAutomation => LeadSequence::decode(value).map(TaskRecord::LeadAutomation),
        TaskKind::GrowthPlan => GrowthPlan::decode(value).map(TaskRecord::GrowthPlan),
    }
}

fn ensure(
    condition: bool,
    task: TaskKind,
    field: impl Into<String>,
    problem: impl Into<String>,
) -> Result<(), ContractViolation> {
    if condition {
        Ok(())
    } else {
        Err(ContractViolation::field(task, field, problem))
    }
}

fn ensure_count<T>(
    task: TaskKind,
    field: &str,
    items: &[T],
    expected: usize,
) -> Result<(), ContractViolation> {
    ensure(
        items.len() == expected,
        task,
        field,
        format!("must have exactly {} entries, found {}", expected, items.len()),
    )
}

fn ensure_amount(task: TaskKind, field: impl Into<String>, amount: f64) -> Result<(), ContractViolation> {
    ensure(
        amount.is_finite() && amount >= 0.0,
        task,
        field,
        format!("must be a non-negative amount, found {}", amount),
    )
}

fn ensure_text(task: TaskKind, field: impl Into<String>, text: &str) -> Result<(), ContractViolation> {
    ensure(!text.trim().is_empty(), task, field, "must not be blank")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_dispatches_on_kind() {
        let value = json!({
            "thirtyDay": {"theme": "Stop the bleeding", "priorities": [
                {"task": "Cancel Asana", "effort": "low", "impact": "high", "addressesIssue": "Duplicate PM tools", "weekTarget": 1}
            ]},
            "sixtyDay": {"theme": "Systems", "priorities": [
                {"task": "Document onboarding", "effort": "medium", "impact": "medium", "addressesIssue": "Process maturity", "weekTarget": 6}
            ]},
            "ninetyDay": {"theme": "Scale", "priorities": [
                {"task": "Automate follow-up", "effort": "high", "impact": "high", "addressesIssue": "Lead leakage", "weekTarget": 10}
            ]}
        });
        let record = validate(TaskKind::GrowthPlan, &value).unwrap();
        assert_eq!(record.kind(), TaskKind::GrowthPlan);

        let err = validate(TaskKind::Diagnostic, &value).unwrap_err();
        assert!(matches!(err, ContractViolation::Shape { task: TaskKind::Diagnostic, .. }));
    }

    #[test]
    fn test_quality_problems_pass_validation() {
        let leaks = json!({
            "totalMonthlySpend": 240,
            "potentialSavings": 0,
            "leaks": [],
            "spendByCategory": [{"category": "", "amount": 240, "tools": 3}]
        });
        let record = validate(TaskKind::MoneyLeaks, &leaks).unwrap();
        let lints = record.lint();
        assert_eq!(lints.len(), 1);
        assert_eq!(
            lints[0].to_string(),
            "money-leaks record field `spendByCategory[0].category` must not be blank"
        );

        let touches: Vec<_> = [0, 3, 1, 7, 10, 14, 21]
            .iter()
            .map(|day| json!({"day": day, "channel": "email", "type": "nudge", "body": "Hi", "purpose": "Follow up"}))
            .collect();
        let sequence = json!({
            "sequenceName": "Nurture",
            "totalDuration": "21 days",
            "touches": touches,
            "expectedMetrics": {"openRate": "40%", "replyRate": "10%", "conversionRate": "5%"}
        });
        let record = validate(TaskKind::LeadAutomation, &sequence).unwrap();
        assert!(record.lint()[0].to_string().contains("touches[2].day"));
    }

    #[test]
    fn test_violation_messages_name_task_and_field() {
        let err = ContractViolation::field(TaskKind::SopBuilder, "sops", "must have exactly 3 entries, found 2");
        assert_eq!(
            err.to_string(),
            "sop-builder record field `sops` must have exactly 3 entries, found 2"
        );
        assert_eq!(err.task(), TaskKind::SopBuilder);
    }

    #[test]
    fn test_ensure_amount_rejects_negative_and_nan() {
        assert!(ensure_amount(TaskKind::MoneyLeaks, "x", 0.0).is_ok());
        assert!(ensure_amount(TaskKind::MoneyLeaks, "x", -1.0).is_err());
        assert!(ensure_amount(TaskKind::MoneyLeaks, "x", f64::NAN).is_err());
    }
}
