//! The five fixed analysis tasks and their dependency tiers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One unit of generation work mapped to one output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    Diagnostic,
    MoneyLeaks,
    SopBuilder,
    LeadAutomation,
    GrowthPlan,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Unknown task '{0}'. Valid values: diagnostic, money-leaks, sop-builder, lead-automation, growth-plan"
)]
pub struct UnknownTaskKind(pub String);

impl TaskKind {
    /// Every task, in dashboard order.
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Diagnostic,
        TaskKind::MoneyLeaks,
        TaskKind::SopBuilder,
        TaskKind::LeadAutomation,
        TaskKind::GrowthPlan,
    ];

    /// Tasks with no prerequisites; they run concurrently in phase one.
    pub const PHASE_ONE: [TaskKind; 4] = [
        TaskKind::Diagnostic,
        TaskKind::MoneyLeaks,
        TaskKind::SopBuilder,
        TaskKind::LeadAutomation,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            TaskKind::Diagnostic => "diagnostic",
            TaskKind::MoneyLeaks => "money-leaks",
            TaskKind::SopBuilder => "sop-builder",
            TaskKind::LeadAutomation => "lead-automation",
            TaskKind::GrowthPlan => "growth-plan",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TaskKind::Diagnostic => "Health Diagnostic",
            TaskKind::MoneyLeaks => "Money Leaks",
            TaskKind::SopBuilder => "SOP Builder",
            TaskKind::LeadAutomation => "Lead Automation",
            TaskKind::GrowthPlan => "Growth Plan",
        }
    }

    /// Tasks whose successful outcome is required before this one may run.
    pub fn prerequisites(&self) -> &'static [TaskKind] {
        match self {
            TaskKind::GrowthPlan => &[TaskKind::Diagnostic, TaskKind::MoneyLeaks],
            _ => &[],
        }
    }

    pub fn phase(&self) -> u8 {
        if self.prerequisites().is_empty() { 1 } else { 2 }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for TaskKind {
    type Err = UnknownTaskKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "diagnostic" | "health-diagnostic" => Ok(TaskKind::Diagnostic),
            "money-leaks" | "moneyleaks" => Ok(TaskKind::MoneyLeaks),
            "sop-builder" | "sops" => Ok(TaskKind::SopBuilder),
            "lead-automation" | "lead-auto" => Ok(TaskKind::LeadAutomation),
            "growth-plan" | "growthplan" => Ok(TaskKind::GrowthPlan),
            _ => Err(UnknownTaskKind(s.to_string())),
        }
    }
}
