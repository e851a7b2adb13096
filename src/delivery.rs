//! Results delivery through the execution webhook.
//!
//! A single POST carries one task's record plus recipient and branding. The
//! webhook's answer is passed back untouched when it is JSON.
//!
//! Slide decks are generated asynchronously; [`WebhookClient::poll_status`]
//! waits for the status endpoint to report the finished deck's URL.

use std::time::{Duration, Instant};

use sbos_common::TaskKind;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::errors::DeliveryError;

pub const DEFAULT_PRIMARY_COLOR: &str = "#2C3FB8";
pub const DEFAULT_ACCENT_COLOR: &str = "#3366FF";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(240);

/// Webhook module name for a task's record.
pub fn delivery_module(task: TaskKind) -> &'static str {
    match task {
        TaskKind::Diagnostic => "health-diagnostic",
        TaskKind::MoneyLeaks => "money-leaks",
        TaskKind::GrowthPlan => "growth-plan",
        TaskKind::SopBuilder => "sop-delivery",
        TaskKind::LeadAutomation => "lead-email",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub primary_color: String,
    pub accent_color: String,
    pub company_name: String,
}

impl Branding {
    /// Default colors with the given company name ("SBOS" when blank).
    pub fn for_company(company_name: &str) -> Self {
        let company_name = if company_name.trim().is_empty() {
            "SBOS"
        } else {
            company_name
        };
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            company_name: company_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPayload {
    pub module: String,
    pub recipient_email: String,
    pub branding: Branding,
    pub data: Value,
}

impl ExecutionPayload {
    pub fn for_task(task: TaskKind, recipient_email: impl Into<String>, branding: Branding, data: Value) -> Self {
        Self {
            module: delivery_module(task).to_string(),
            recipient_email: recipient_email.into(),
            branding,
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// Total time spent polling before giving up.
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Progress reported while waiting on the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Processing { elapsed: Duration },
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Ready(String),
    TimedOut,
}

pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
    status_url: Option<String>,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            status_url: None,
        }
    }

    pub fn with_status_url(mut self, status_url: Option<&str>) -> Self {
        self.status_url = status_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        self
    }

    /// Client for an optional configured URL.
    pub fn from_url(url: Option<&str>) -> Result<Self, DeliveryError> {
        match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => Ok(Self::new(url)),
            None => Err(DeliveryError::NotConfigured),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `payload` and return the webhook's response.
    ///
    /// Non-JSON bodies come back as `{"success": <2xx>, "raw": <text>}`.
    pub async fn send(&self, payload: &ExecutionPayload) -> Result<Value, DeliveryError> {
        debug!(module = %payload.module, url = %self.url, "Posting execution payload");
        let response = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(DeliveryError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(module = %payload.module, status = status.as_u16(), "Webhook returned non-success status");
        }

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        if is_json {
            return response.json::<Value>().await.map_err(DeliveryError::Body);
        }

        let raw = response.text().await.map_err(DeliveryError::Body)?;
        Ok(json!({ "success": status.is_success(), "raw": raw }))
    }

    /// Poll the status endpoint until it reports a deck URL or `options.timeout` passes.
    ///
    /// Unreachable endpoints and unreadable bodies count as "not ready yet".
    pub async fn poll_status(
        &self,
        options: PollOptions,
        mut on_status: impl FnMut(PollStatus),
    ) -> Result<PollOutcome, DeliveryError> {
        let Some(status_url) = self.status_url.as_deref() else {
            return Err(DeliveryError::StatusNotConfigured);
        };

        let started = Instant::now();
        while started.elapsed() < options.timeout {
            match self.fetch_status(status_url).await {
                Ok(Some(url)) => {
                    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Deck is ready");
                    return Ok(PollOutcome::Ready(url));
                }
                Ok(None) => on_status(PollStatus::Processing {
                    elapsed: started.elapsed(),
                }),
                Err(e) => debug!(error = %e, "Status check failed, polling again"),
            }
            tokio::time::sleep(options.interval).await;
        }

        warn!(timeout_secs = options.timeout.as_secs(), "Gave up waiting for the deck");
        on_status(PollStatus::Timeout);
        Ok(PollOutcome::TimedOut)
    }

    async fn fetch_status(&self, status_url: &str) -> Result<Option<String>, reqwest::Error> {
        let body: Value = self.http.get(status_url).send().await?.json().await?;
        Ok(body
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string))
    }
}
