//! Prompt preview: `sbos prompt <task>`.

use std::path::Path;

use anyhow::{Result, bail};
use sbos::TaskKind;
use sbos::prompts::{self, GrowthContext};
use serde_json::Value;

use super::super::IntakeArgs;
use super::{load_intake, read_json};

pub fn cmd_prompt(
    task: TaskKind,
    input: &IntakeArgs,
    diagnostic: Option<&Path>,
    money_leaks: Option<&Path>,
) -> Result<()> {
    let intake = load_intake(input)?;

    let (diagnostic, money_leaks) = match (task, diagnostic, money_leaks) {
        (TaskKind::GrowthPlan, Some(d), Some(m)) => (Some(read_json::<Value>(d)?), Some(read_json::<Value>(m)?)),
        (TaskKind::GrowthPlan, _, _) => {
            bail!("The growth-plan prompt needs both --diagnostic and --money-leaks record files")
        }
        _ => (None, None),
    };

    let context = match (&diagnostic, &money_leaks) {
        (Some(diagnostic), Some(money_leaks)) => Some(GrowthContext {
            diagnostic,
            money_leaks,
        }),
        _ => None,
    };

    match prompts::prompt_for(task, &intake, context) {
        Some(prompt) => println!("{}", prompt),
        None => bail!("No prompt available for {}", task),
    }
    Ok(())
}
