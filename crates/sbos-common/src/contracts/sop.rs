use serde::{Deserialize, Serialize};

use super::{Contract, ContractViolation, ensure, ensure_count, ensure_text};
use crate::task::TaskKind;

/// Number of procedures the SOP builder must produce.
pub const SOP_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SopStep {
    pub number: u32,
    pub action: String,
    pub owner: String,
    pub timing: String,
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sop {
    pub title: String,
    pub version: String,
    pub owner: String,
    pub frequency: String,
    pub estimated_time: String,
    pub steps: Vec<SopStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SopCollection {
    pub sops: Vec<Sop>,
}

impl Contract for SopCollection {
    const TASK: TaskKind = TaskKind::SopBuilder;

    fn check(&self) -> Result<(), ContractViolation> {
        let task = Self::TASK;
        ensure_count(task, "sops", &self.sops, SOP_COUNT)
    }

    fn lint(&self) -> Vec<ContractViolation> {
        let task = Self::TASK;
        let mut lints = Vec::new();
        for (i, sop) in self.sops.iter().enumerate() {
            lints.extend(ensure_text(task, format!("sops[{}].title", i), &sop.title).err());
            lints.extend(
                ensure(
                    !sop.steps.is_empty(),
                    task,
                    format!("sops[{}].steps", i),
                    "should not be empty",
                )
                .err(),
            );
            for (j, pair) in sop.steps.windows(2).enumerate() {
                lints.extend(
                    ensure(
                        pair[1].number > pair[0].number,
                        task,
                        format!("sops[{}].steps[{}].number", i, j + 1),
                        format!(
                            "should follow step {} in ascending order, found {}",
                            pair[0].number, pair[1].number
                        ),
                    )
                    .err(),
                );
            }
        }
        lints
    }
}
