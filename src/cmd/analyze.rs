//! Full analysis run: `sbos analyze`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use sbos::analysis::{AnalysisOrchestrator, RunCompletion};
use sbos::completion::{CompletionClient, SampleClient};
use sbos::config::SbosConfig;
use sbos::runner::TaskRunner;
use sbos::ui::{AnalysisUi, UiMode};
use tokio::sync::mpsc;
use tracing::info;

use super::super::{Cli, IntakeArgs};
use super::load_intake;

const EVENT_BUFFER: usize = 32;

pub async fn cmd_analyze(
    cli: &Cli,
    config: SbosConfig,
    input: &IntakeArgs,
    ui_mode: UiMode,
    output: Option<&Path>,
    offline: bool,
) -> Result<()> {
    let intake = load_intake(input)?;
    let client: Arc<dyn CompletionClient> = if offline {
        if ui_mode != UiMode::Json {
            println!("{}", style("Offline: showing bundled sample results.").yellow());
        }
        Arc::new(SampleClient::new())
    } else {
        config.completion_client()?
    };
    info!(
        provider = client.name(),
        model = %config.toml.completion.model,
        "Using completion service"
    );

    let orchestrator = AnalysisOrchestrator::new(TaskRunner::new(client, config.runner_config()));
    let mut ui = AnalysisUi::new(ui_mode, cli.verbose);
    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);

    let render = async {
        while let Some(event) = rx.recv().await {
            ui.handle_event(&event);
        }
    };
    let (state, ()) = tokio::join!(orchestrator.run_with_events(&intake, tx), render);

    ui.print_final(&state);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&state).context("Failed to serialize run state")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run state to {}", path.display()))?;
        if ui_mode != UiMode::Json {
            println!("Run state written to {}", path.display());
        }
    }

    if ui_mode != UiMode::Json {
        match state.completion() {
            RunCompletion::AllSucceeded => {
                println!("{}", style("All five analyses succeeded.").green().bold());
            }
            RunCompletion::GrowthPlanSkipped { failed } => {
                println!(
                    "{} failed; growth plan skipped.",
                    style(ids(&failed)).red()
                );
            }
            RunCompletion::CompletedWithFailures { failed } => {
                println!("{} failed.", style(ids(&failed)).red());
            }
            RunCompletion::InProgress => {}
        }
    }

    Ok(())
}

fn ids(tasks: &[sbos::TaskKind]) -> String {
    tasks.iter().map(|t| t.id()).collect::<Vec<_>>().join(", ")
}
