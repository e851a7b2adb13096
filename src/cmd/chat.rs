//! One-shot business assistant question: `sbos chat`.

use std::path::Path;

use anyhow::{Context, Result};
use sbos::chat::BusinessAssistant;
use sbos::config::SbosConfig;

use super::super::IntakeArgs;
use super::{load_intake, load_run_state};

pub async fn cmd_chat(
    config: &SbosConfig,
    input: &IntakeArgs,
    results: Option<&Path>,
    message: &str,
) -> Result<()> {
    let intake = load_intake(input)?;
    let results = results.map(load_run_state).transpose()?;

    let assistant = BusinessAssistant::new(config.completion_client()?);
    let reply = assistant
        .reply(message, &[], &intake, results.as_ref())
        .await
        .context("Assistant request failed")?;

    println!("{}", reply);
    Ok(())
}
