use serde::{Deserialize, Serialize};

use super::{Contract, ContractViolation, ensure, ensure_text};
use crate::task::TaskKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Priority {
    pub task: String,
    pub effort: Level,
    pub impact: Level,
    /// The diagnostic finding or money leak this priority fixes.
    pub addresses_issue: String,
    pub week_target: u32,
}

impl Priority {
    /// High impact for low effort.
    pub fn is_quick_win(&self) -> bool {
        self.impact == Level::High && self.effort == Level::Low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPhase {
    pub theme: String,
    pub priorities: Vec<Priority>,
}

/// Prioritized 30/60/90 day improvement plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPlan {
    pub thirty_day: PlanPhase,
    pub sixty_day: PlanPhase,
    pub ninety_day: PlanPhase,
}

impl GrowthPlan {
    pub fn phases(&self) -> [(&'static str, &PlanPhase); 3] {
        [
            ("thirtyDay", &self.thirty_day),
            ("sixtyDay", &self.sixty_day),
            ("ninetyDay", &self.ninety_day),
        ]
    }
}

impl Contract for GrowthPlan {
    const TASK: TaskKind = TaskKind::GrowthPlan;

    /// Field types and enum values are enforced by decoding alone.
    fn check(&self) -> Result<(), ContractViolation> {
        Ok(())
    }

    fn lint(&self) -> Vec<ContractViolation> {
        let task = Self::TASK;
        let mut lints = Vec::new();
        for (field, phase) in self.phases() {
            lints.extend(ensure_text(task, format!("{}.theme", field), &phase.theme).err());
            lints.extend(
                ensure(
                    !phase.priorities.is_empty(),
                    task,
                    format!("{}.priorities", field),
                    "should not be empty",
                )
                .err(),
            );
            for (i, priority) in phase.priorities.iter().enumerate() {
                lints.extend(
                    ensure_text(task, format!("{}.priorities[{}].task", field, i), &priority.task).err(),
                );
            }
        }
        lints
    }
}
