//! CLI command implementations.
//!
//! | Module     | Commands handled |
//! |------------|------------------|
//! | `analyze`  | `Analyze`        |
//! | `prompt`   | `Prompt`         |
//! | `chat`     | `Chat`           |
//! | `deliver`  | `Deliver`        |
//! | `config`   | `Config`         |

pub mod analyze;
pub mod chat;
pub mod config;
pub mod deliver;
pub mod prompt;

pub use analyze::cmd_analyze;
pub use chat::cmd_chat;
pub use config::cmd_config;
pub use deliver::cmd_deliver;
pub use prompt::cmd_prompt;

use std::path::Path;

use anyhow::{Context, Result};
use sbos::IntakeRecord;
use sbos::analysis::AnalysisRunState;
use serde::de::DeserializeOwned;

use super::IntakeArgs;

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// The intake selected on the command line, validated.
pub fn load_intake(args: &IntakeArgs) -> Result<IntakeRecord> {
    let intake = match &args.intake {
        Some(path) => read_json::<IntakeRecord>(path)?,
        None => IntakeRecord::sample(),
    };
    intake.validate().context("Invalid intake")?;
    Ok(intake)
}

/// A run state previously written by `analyze --output`.
pub fn load_run_state(path: &Path) -> Result<AnalysisRunState> {
    read_json(path).with_context(|| format!("{} is not an analysis run state", path.display()))
}
