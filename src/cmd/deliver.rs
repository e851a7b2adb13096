//! Webhook delivery of one record: `sbos deliver <task>`.

use std::path::Path;

use anyhow::{Context, Result, bail};
use sbos::TaskKind;
use sbos::config::SbosConfig;
use sbos::delivery::{Branding, ExecutionPayload, PollOutcome, PollStatus, WebhookClient};

use super::load_run_state;

pub async fn cmd_deliver(
    config: &SbosConfig,
    task: TaskKind,
    results: &Path,
    to: &str,
    company: Option<&str>,
    wait: bool,
) -> Result<()> {
    if to.trim().is_empty() {
        bail!("Recipient email is empty");
    }

    let state = load_run_state(results)?;
    let Some(record) = state.record(task) else {
        bail!(
            "No succeeded {} record in {} (status: {:?})",
            task,
            results.display(),
            state.status(task)
        );
    };

    let delivery = &config.toml.delivery;
    if wait && delivery.status_url.is_none() {
        bail!("--wait needs a status URL. Set SBOS_STATUS_URL or [delivery].status_url in sbos.toml");
    }
    let client = WebhookClient::from_url(delivery.webhook_url.as_deref())
        .context("Set SBOS_WEBHOOK_URL or [delivery].webhook_url in sbos.toml")?
        .with_status_url(delivery.status_url.as_deref());
    let payload = ExecutionPayload::for_task(
        task,
        to,
        Branding::for_company(company.unwrap_or_default()),
        record.clone(),
    );

    let response = client.send(&payload).await.context("Webhook delivery failed")?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if wait {
        let options = delivery.poll_options();
        eprintln!(
            "Waiting up to {}s for the presentation...",
            options.timeout.as_secs()
        );
        let outcome = client
            .poll_status(options, |status| match status {
                PollStatus::Processing { elapsed } => {
                    eprintln!("  still processing ({}s elapsed)", elapsed.as_secs())
                }
                PollStatus::Timeout => eprintln!("  timed out"),
            })
            .await
            .context("Status polling failed")?;
        match outcome {
            PollOutcome::Ready(url) => println!("Presentation ready: {}", url),
            PollOutcome::TimedOut => bail!(
                "No presentation URL after {}s",
                options.timeout.as_secs()
            ),
        }
    }
    Ok(())
}
