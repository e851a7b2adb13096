//! Command-line tests for the `sbos` binary. None of these reach the network.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

mod common;

/// `sbos` in an empty project with no credentials in the environment.
fn sbos(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("sbos");
    cmd.current_dir(dir.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("VITE_GEMINI_API_KEY")
        .env_remove("SBOS_MODEL")
        .env_remove("SBOS_REQUEST_TIMEOUT_SECS")
        .env_remove("SBOS_WEBHOOK_URL")
        .env_remove("VITE_N8N_WEBHOOK_URL")
        .env_remove("SBOS_STATUS_URL")
        .env_remove("VITE_N8N_STATUS_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn project() -> TempDir {
    TempDir::new().unwrap()
}

// =============================================================================
// Basic CLI
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        let dir = project();
        sbos(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("analyze"))
            .stdout(predicate::str::contains("prompt"));
    }

    #[test]
    fn test_version() {
        let dir = project();
        sbos(&dir).arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_task_rejected() {
        let dir = project();
        sbos(&dir)
            .args(["prompt", "forecast", "--sample"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown task"));
    }

    #[test]
    fn test_intake_source_required() {
        let dir = project();
        sbos(&dir).args(["prompt", "diagnostic"]).assert().failure();
    }
}

// =============================================================================
// Prompt preview
// =============================================================================

mod prompts {
    use super::*;

    #[test]
    fn test_sample_diagnostic_prompt() {
        let dir = project();
        sbos(&dir)
            .args(["prompt", "diagnostic", "--sample"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("You are a business operations analyst."))
            .stdout(predicate::str::contains("Acme Local Services"));
    }

    #[test]
    fn test_prompt_from_intake_file() {
        let dir = project();
        let intake = dir.path().join("intake.json");
        fs::write(
            &intake,
            json!({"companyName": "Harbor Plumbing", "teamSize": 4, "processes": ["Dispatch", " "]})
                .to_string(),
        )
        .unwrap();

        sbos(&dir)
            .args(["prompt", "sop-builder", "--intake"])
            .arg(&intake)
            .assert()
            .success()
            .stdout(predicate::str::contains("Harbor Plumbing"))
            .stdout(predicate::str::contains("Dispatch"));
    }

    #[test]
    fn test_intake_without_company_rejected() {
        let dir = project();
        let intake = dir.path().join("intake.json");
        fs::write(&intake, json!({"companyName": "  "}).to_string()).unwrap();

        sbos(&dir)
            .args(["prompt", "diagnostic", "--intake"])
            .arg(&intake)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid intake"));
    }

    #[test]
    fn test_growth_plan_prompt_needs_context() {
        let dir = project();
        sbos(&dir)
            .args(["prompt", "growth-plan", "--sample"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--diagnostic"));
    }

    #[test]
    fn test_growth_plan_prompt_embeds_records() {
        let dir = project();
        let diagnostic = dir.path().join("diagnostic.json");
        let leaks = dir.path().join("leaks.json");
        fs::write(&diagnostic, common::diagnostic_record().to_string()).unwrap();
        fs::write(&leaks, common::money_leaks_record().to_string()).unwrap();

        sbos(&dir)
            .args(["prompt", "growth-plan", "--sample", "--diagnostic"])
            .arg(&diagnostic)
            .arg("--money-leaks")
            .arg(&leaks)
            .assert()
            .success()
            .stdout(predicate::str::starts_with("You are a business growth strategist."))
            .stdout(predicate::str::contains("\"overallScore\": 72"))
            .stdout(predicate::str::contains("\"potentialSavings\": 450"));
    }
}

// =============================================================================
// Commands needing credentials
// =============================================================================

mod credentials {
    use super::*;

    #[test]
    fn test_analyze_without_api_key_fails() {
        let dir = project();
        sbos(&dir)
            .args(["analyze", "--sample", "--ui", "minimal"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("API key"))
            .stderr(predicate::str::contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_placeholder_api_key_counts_as_missing() {
        let dir = project();
        sbos(&dir)
            .env("GEMINI_API_KEY", "your_gemini_api_key_here")
            .args(["chat", "--sample", "What should I fix first?"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("API key"));
    }

    #[test]
    fn test_offline_analyze_needs_no_api_key() {
        let dir = project();
        let output = dir.path().join("run.json");
        sbos(&dir)
            .args(["analyze", "--sample", "--offline", "--ui", "minimal", "--output"])
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline"))
            .stdout(predicate::str::contains("Done: 5/5 succeeded"))
            .stdout(predicate::str::contains("All five analyses succeeded."));

        let state: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(state["outcomes"]["growth-plan"]["status"], "succeeded");
        assert_eq!(state["outcomes"]["diagnostic"]["record"]["overallScore"], 62);
    }

    #[test]
    fn test_invalid_ui_mode_rejected() {
        let dir = project();
        sbos(&dir)
            .args(["analyze", "--sample", "--ui", "fancy"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid UI mode"));
    }
}

// =============================================================================
// Delivery
// =============================================================================

mod delivery {
    use super::*;

    fn write_results(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("results.json");
        let state = json!({
            "run_id": "1b4e28ba-2fa1-41d2-883f-0016d3cca427",
            "started_at": "2026-01-05T10:00:00Z",
            "outcomes": {
                "diagnostic": {"status": "succeeded", "record": common::diagnostic_record()},
                "money-leaks": {"status": "failed", "failure": {"kind": "completion", "message": "quota"}}
            },
            "skipped": ["growth-plan"]
        });
        fs::write(&path, state.to_string()).unwrap();
        path
    }

    #[test]
    fn test_deliver_without_webhook_fails() {
        let dir = project();
        let results = write_results(&dir);
        sbos(&dir)
            .args(["deliver", "diagnostic", "--to", "owner@acme.test", "--results"])
            .arg(&results)
            .assert()
            .failure()
            .stderr(predicate::str::contains("SBOS_WEBHOOK_URL"));
    }

    #[test]
    fn test_deliver_unsucceeded_task_fails() {
        let dir = project();
        let results = write_results(&dir);
        sbos(&dir)
            .env("SBOS_WEBHOOK_URL", "http://127.0.0.1:9/hook")
            .args(["deliver", "growth-plan", "--to", "owner@acme.test", "--results"])
            .arg(&results)
            .assert()
            .failure()
            .stderr(predicate::str::contains("No succeeded growth-plan record"));
    }

    #[test]
    fn test_deliver_wait_without_status_url_fails() {
        let dir = project();
        let results = write_results(&dir);
        sbos(&dir)
            .env("SBOS_WEBHOOK_URL", "http://127.0.0.1:9/hook")
            .args(["deliver", "diagnostic", "--wait", "--to", "owner@acme.test", "--results"])
            .arg(&results)
            .assert()
            .failure()
            .stderr(predicate::str::contains("SBOS_STATUS_URL"));
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod configuration {
    use super::*;

    #[test]
    fn test_config_init_creates_file() {
        let dir = project();
        sbos(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created sbos.toml"));

        let content = fs::read_to_string(dir.path().join(".sbos/sbos.toml")).unwrap();
        assert!(content.contains("[completion]"));
        assert!(content.contains("gemini-2.0-flash"));
    }

    #[test]
    fn test_config_init_keeps_existing_file() {
        let dir = project();
        sbos(&dir).args(["config", "init"]).assert().success();
        sbos(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_show_reflects_file_and_env() {
        let dir = project();
        fs::create_dir_all(dir.path().join(".sbos")).unwrap();
        fs::write(
            dir.path().join(".sbos/sbos.toml"),
            "[completion]\nmodel = \"gemini-1.5-pro\"\nrequest_timeout_secs = 90\n",
        )
        .unwrap();

        sbos(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("model = \"gemini-1.5-pro\""))
            .stdout(predicate::str::contains("request_timeout_secs = 90"))
            .stdout(predicate::str::contains("api key configured = false"));

        sbos(&dir)
            .env("SBOS_MODEL", "gemini-2.5-flash")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("model = \"gemini-2.5-flash\""));
    }

    #[test]
    fn test_config_show_without_file() {
        let dir = project();
        sbos(&dir)
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("No sbos.toml found"))
            .stdout(predicate::str::contains("request_timeout_secs = (none)"));
    }
}
