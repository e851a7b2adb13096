//! Configuration view and setup: `sbos config`.

use anyhow::Result;
use sbos::config::{SbosConfig, SbosToml};

use super::super::ConfigCommands;

pub fn cmd_config(config: &SbosConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = config.config_path();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("SBOS Configuration");
            println!("==================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
                for warning in SbosToml::load(&config_path)?.validate() {
                    println!("  warning: {}", warning);
                }
            } else {
                println!("No sbos.toml found at {}", config_path.display());
                println!("Run 'sbos config init' to create one.");
            }
            println!();

            let toml = &config.toml;
            println!("Effective values (with env overrides):");
            println!("[completion]");
            println!("  model = \"{}\"", toml.completion.model);
            println!("  endpoint = \"{}\"", toml.completion.endpoint);
            println!("  api_key_env = \"{}\"", toml.completion.api_key_env);
            match toml.completion.request_timeout_secs {
                Some(secs) => println!("  request_timeout_secs = {}", secs),
                None => println!("  request_timeout_secs = (none)"),
            }
            println!("  connect_timeout_secs = {}", toml.completion.connect_timeout_secs);
            println!(
                "  api key configured = {}",
                config.is_api_key_configured()
            );
            println!("[analysis]");
            println!("  enforce_contracts = {}", toml.analysis.enforce_contracts);
            println!("  excerpt_chars = {}", toml.analysis.excerpt_chars);
            println!("[logging]");
            println!("  level = \"{}\"", toml.logging.level);
            println!("  format = \"{}\"", toml.logging.format);
            println!("[delivery]");
            match &toml.delivery.webhook_url {
                Some(url) => println!("  webhook_url = \"{}\"", url),
                None => println!("  webhook_url = (not set)"),
            }
            match &toml.delivery.status_url {
                Some(url) => println!("  status_url = \"{}\"", url),
                None => println!("  status_url = (not set)"),
            }
            println!("  poll_interval_secs = {}", toml.delivery.poll_interval_secs);
            println!("  poll_timeout_secs = {}", toml.delivery.poll_timeout_secs);
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("sbos.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            std::fs::create_dir_all(config.config_dir())?;
            SbosToml::default().save(&config_path)?;

            println!("Created sbos.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [completion] model, endpoint, request_timeout_secs");
            println!("  - [analysis] enforce_contracts, excerpt_chars");
            println!("  - [delivery] webhook_url, status_url, poll_interval_secs");
            println!();
        }
    }

    Ok(())
}
