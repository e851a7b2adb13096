use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sbos::config::{LogFormat, SbosConfig};
use sbos::logging::{self, LogOptions};
use sbos::ui::UiMode;
use sbos::TaskKind;
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "sbos")]
#[command(version, about = "Small-business operations analysis from a business intake")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding `.sbos/sbos.toml` (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Log output format: pretty or json. Overrides sbos.toml.
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the business intake comes from.
#[derive(Args, Clone, Debug)]
#[group(required = true, multiple = false)]
pub struct IntakeArgs {
    /// Intake JSON file
    #[arg(long)]
    pub intake: Option<PathBuf>,

    /// Use the built-in Acme Local Services intake
    #[arg(long)]
    pub sample: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run all five analyses for an intake
    Analyze {
        #[command(flatten)]
        input: IntakeArgs,

        /// Progress output: full, minimal or json
        #[arg(long, default_value = "full")]
        ui: UiMode,

        /// Write the final run state as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model name, overriding config and SBOS_MODEL
        #[arg(long)]
        model: Option<String>,

        /// Per-call timeout in seconds (no limit by default)
        #[arg(long)]
        timeout: Option<u64>,

        /// Answer from bundled sample results instead of calling the service
        #[arg(long)]
        offline: bool,
    },
    /// Print the prompt a task would send, without calling the service
    Prompt {
        task: TaskKind,

        #[command(flatten)]
        input: IntakeArgs,

        /// Diagnostic record JSON, required for growth-plan
        #[arg(long)]
        diagnostic: Option<PathBuf>,

        /// Money-leaks record JSON, required for growth-plan
        #[arg(long)]
        money_leaks: Option<PathBuf>,
    },
    /// Ask the business assistant one question
    Chat {
        #[command(flatten)]
        input: IntakeArgs,

        /// Run state written by `analyze --output`
        #[arg(long)]
        results: Option<PathBuf>,

        message: String,
    },
    /// Send one task's record to the execution webhook
    Deliver {
        task: TaskKind,

        /// Run state written by `analyze --output`
        #[arg(long)]
        results: PathBuf,

        /// Recipient email address
        #[arg(long)]
        to: String,

        /// Company name used for branding
        #[arg(long)]
        company: Option<String>,

        /// Poll the status URL until the generated deck is ready
        #[arg(long)]
        wait: bool,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the config file and effective values
    Show,
    /// Create a default sbos.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = SbosConfig::load(project_dir)?;

    let _log_guard = logging::init_tracing(&LogOptions {
        verbose: cli.verbose,
        level: &config.toml.logging.level,
        format: cli.log_format.unwrap_or(config.toml.logging.format),
        file: cli.log_file.as_deref(),
        spinners: matches!(cli.command, Commands::Analyze { ui: UiMode::Full, .. }),
    })?;

    match &cli.command {
        Commands::Analyze {
            input,
            ui,
            output,
            model,
            timeout,
            offline,
        } => {
            let config = config
                .with_model(model.clone())
                .with_request_timeout_secs(*timeout);
            cmd::cmd_analyze(&cli, config, input, *ui, output.as_deref(), *offline).await?;
        }
        Commands::Prompt {
            task,
            input,
            diagnostic,
            money_leaks,
        } => cmd::cmd_prompt(*task, input, diagnostic.as_deref(), money_leaks.as_deref())?,
        Commands::Chat {
            input,
            results,
            message,
        } => cmd::cmd_chat(&config, input, results.as_deref(), message).await?,
        Commands::Deliver {
            task,
            results,
            to,
            company,
            wait,
        } => cmd::cmd_deliver(&config, *task, results, to, company.as_deref(), *wait).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
