use serde::{Deserialize, Serialize};

use super::{Contract, ContractViolation, ensure_amount, ensure_text};
use crate::task::TaskKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakKind {
    Duplicate,
    Underutilized,
    Overlap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Moderate,
    Low,
}

/// One source of wasted spend.
///
/// Duplicate leaks usually name the competing `tools`; underutilized leaks
/// name a single `tool` with its `monthly_cost` and `usage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leak {
    #[serde(rename = "type")]
    pub kind: LeakKind,
    pub severity: Severity,
    pub monthly_savings: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub category: String,
    pub amount: f64,
    /// Number of tools billed under this category.
    pub tools: u32,
}

/// Spend analysis: duplicates, underused subscriptions and overlaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyLeakReport {
    pub total_monthly_spend: f64,
    pub potential_savings: f64,
    pub leaks: Vec<Leak>,
    pub spend_by_category: Vec<CategorySpend>,
}

impl MoneyLeakReport {
    /// Leaks ordered from most to least severe.
    pub fn leaks_by_severity(&self) -> Vec<&Leak> {
        let mut leaks: Vec<&Leak> = self.leaks.iter().collect();
        leaks.sort_by_key(|leak| leak.severity);
        leaks
    }
}

impl Contract for MoneyLeakReport {
    const TASK: TaskKind = TaskKind::MoneyLeaks;

    /// Field types and enum values are enforced by decoding alone.
    fn check(&self) -> Result<(), ContractViolation> {
        Ok(())
    }

    fn lint(&self) -> Vec<ContractViolation> {
        let task = Self::TASK;
        let mut lints = Vec::new();
        lints.extend(ensure_amount(task, "totalMonthlySpend", self.total_monthly_spend).err());
        lints.extend(ensure_amount(task, "potentialSavings", self.potential_savings).err());
        for (i, leak) in self.leaks.iter().enumerate() {
            lints.extend(ensure_amount(task, format!("leaks[{}].monthlySavings", i), leak.monthly_savings).err());
            if let Some(cost) = leak.monthly_cost {
                lints.extend(ensure_amount(task, format!("leaks[{}].monthlyCost", i), cost).err());
            }
        }
        for (i, spend) in self.spend_by_category.iter().enumerate() {
            lints.extend(ensure_text(task, format!("spendByCategory[{}].category", i), &spend.category).err());
            lints.extend(ensure_amount(task, format!("spendByCategory[{}].amount", i), spend.amount).err());
        }
        lints
    }
}
