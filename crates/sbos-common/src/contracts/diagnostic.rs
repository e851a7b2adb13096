use serde::{Deserialize, Serialize};

use super::{Contract, ContractViolation, ensure, ensure_count, ensure_text};
use crate::task::TaskKind;

/// Number of scored categories a diagnostic must contain.
pub const CATEGORY_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryStatus {
    Stable,
    AtRisk,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticCategory {
    pub name: String,
    pub score: u32,
    pub status: CategoryStatus,
    pub insight: String,
}

/// Business health scores across the five operating categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub overall_score: u32,
    pub categories: Vec<DiagnosticCategory>,
    pub quick_wins: Vec<String>,
    pub risks: Vec<String>,
}

impl DiagnosticReport {
    pub fn categories_with_status(&self, status: CategoryStatus) -> impl Iterator<Item = &DiagnosticCategory> {
        self.categories.iter().filter(move |c| c.status == status)
    }
}

impl Contract for DiagnosticReport {
    const TASK: TaskKind = TaskKind::Diagnostic;

    fn check(&self) -> Result<(), ContractViolation> {
        let task = Self::TASK;
        ensure(
            self.overall_score <= 100,
            task,
            "overallScore",
            format!("must be between 0 and 100, found {}", self.overall_score),
        )?;
        ensure_count(task, "categories", &self.categories, CATEGORY_COUNT)?;
        for (i, category) in self.categories.iter().enumerate() {
            ensure(
                category.score <= 100,
                task,
                format!("categories[{}].score", i),
                format!("must be between 0 and 100, found {}", category.score),
            )?;
        }
        Ok(())
    }

    fn lint(&self) -> Vec<ContractViolation> {
        self.categories
            .iter()
            .enumerate()
            .filter_map(|(i, category)| {
                ensure_text(Self::TASK, format!("categories[{}].name", i), &category.name).err()
            })
            .collect()
    }
}
