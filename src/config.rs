//! Layered configuration: defaults, `.sbos/sbos.toml`, environment, CLI.
//!
//! The file is optional. Environment variables (after `.env` is loaded by the
//! binary) override file values, and command-line flags override both.
//!
//! ```toml
//! [completion]
//! model = "gemini-2.0-flash"
//! request_timeout_secs = 120
//!
//! [analysis]
//! enforce_contracts = true
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [delivery]
//! webhook_url = "https://n8n.example.com/webhook/sbos"
//! status_url = "https://n8n.example.com/webhook/sbos-status"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::completion::gemini::{self, GeminiClient, is_usable_api_key};
use crate::completion::CompletionClient;
use crate::delivery::PollOptions;
use crate::runner::RunnerConfig;

pub const CONFIG_DIR: &str = ".sbos";
pub const CONFIG_FILE: &str = "sbos.toml";

/// Legacy variable names from the web front end, read as fallbacks.
const LEGACY_API_KEY_ENV: &str = "VITE_GEMINI_API_KEY";
const LEGACY_WEBHOOK_ENV: &str = "VITE_N8N_WEBHOOK_URL";
const LEGACY_STATUS_ENV: &str = "VITE_N8N_STATUS_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Per-call limit; unset means wait as long as the service takes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_model() -> String {
    gemini::DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    gemini::DEFAULT_ENDPOINT.to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl CompletionConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Check each record against its typed contract after parsing.
    #[serde(default = "default_enforce_contracts")]
    pub enforce_contracts: bool,
    /// Characters of raw output kept on a parse failure.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_enforce_contracts() -> bool {
    true
}

fn default_excerpt_chars() -> usize {
    200
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enforce_contracts: default_enforce_contracts(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Endpoint reporting the generated deck's URL once it exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_url: Option<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_poll_timeout_secs() -> u64 {
    240
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            status_url: None,
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl DeliveryConfig {
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }
}

/// Contents of `sbos.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SbosToml {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

impl SbosToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse sbos.toml")
    }

    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize sbos.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Non-fatal problems worth showing to the user.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.completion.model.trim().is_empty() {
            warnings.push("completion.model is empty".to_string());
        }
        if !self.completion.endpoint.starts_with("http://")
            && !self.completion.endpoint.starts_with("https://")
        {
            warnings.push(format!(
                "completion.endpoint '{}' is not an http(s) URL",
                self.completion.endpoint
            ));
        }
        if self.completion.request_timeout_secs == Some(0) {
            warnings.push("completion.request_timeout_secs = 0 fails every call".to_string());
        }
        if self.delivery.poll_interval_secs == 0 {
            warnings.push("delivery.poll_interval_secs = 0 polls without pausing".to_string());
        }
        if self.analysis.excerpt_chars == 0 {
            warnings.push("analysis.excerpt_chars = 0 hides raw output on parse failures".to_string());
        }
        warnings
    }
}

/// Effective configuration after every layer is applied.
#[derive(Debug, Clone)]
pub struct SbosConfig {
    pub project_dir: PathBuf,
    pub toml: SbosToml,
    api_key: Option<String>,
}

impl SbosConfig {
    /// Load the project's config file and apply process environment overrides.
    pub fn load(project_dir: PathBuf) -> Result<Self> {
        let toml = SbosToml::load_or_default(&project_dir.join(CONFIG_DIR))?;
        Self::from_parts(project_dir, toml, |name| std::env::var(name).ok())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn from_parts(
        project_dir: PathBuf,
        mut toml: SbosToml,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if let Some(model) = lookup("SBOS_MODEL").filter(|v| !v.trim().is_empty()) {
            toml.completion.model = model;
        }
        if let Some(endpoint) = lookup("SBOS_ENDPOINT").filter(|v| !v.trim().is_empty()) {
            toml.completion.endpoint = endpoint;
        }
        if let Some(secs) = lookup("SBOS_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("SBOS_REQUEST_TIMEOUT_SECS must be whole seconds, got '{}'", secs))?;
            toml.completion.request_timeout_secs = Some(secs);
        }
        if let Some(level) = lookup("SBOS_LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            toml.logging.level = level;
        }
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_blank("SBOS_WEBHOOK_URL").or_else(|| non_blank(LEGACY_WEBHOOK_ENV)) {
            toml.delivery.webhook_url = Some(url);
        }
        if let Some(url) = non_blank("SBOS_STATUS_URL").or_else(|| non_blank(LEGACY_STATUS_ENV)) {
            toml.delivery.status_url = Some(url);
        }

        let api_key = lookup(&toml.completion.api_key_env)
            .filter(|k| is_usable_api_key(k))
            .or_else(|| lookup(LEGACY_API_KEY_ENV).filter(|k| is_usable_api_key(k)));

        Ok(Self {
            project_dir,
            toml,
            api_key,
        })
    }

    pub fn config_dir(&self) -> PathBuf {
        self.project_dir.join(CONFIG_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE)
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.toml.completion.model = model;
        }
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: Option<u64>) -> Self {
        if secs.is_some() {
            self.toml.completion.request_timeout_secs = secs;
        }
        self
    }

    pub fn is_api_key_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn require_api_key(&self) -> Result<&str> {
        match &self.api_key {
            Some(key) => Ok(key),
            None => bail!(
                "Gemini API key not configured. Set {} in the environment or .env",
                self.toml.completion.api_key_env
            ),
        }
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            request_timeout: self.toml.completion.request_timeout(),
            enforce_contracts: self.toml.analysis.enforce_contracts,
            excerpt_chars: self.toml.analysis.excerpt_chars,
        }
    }

    /// Build the completion client this configuration describes.
    pub fn completion_client(&self) -> Result<Arc<dyn CompletionClient>> {
        let key = self.require_api_key()?;
        let client = GeminiClient::from_config(&self.toml.completion, key)
            .context("Failed to construct completion client")?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // =========================================
    // File layer
    // =========================================

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempdir().unwrap();
        let toml = SbosToml::load_or_default(&dir.path().join(CONFIG_DIR)).unwrap();
        assert_eq!(toml, SbosToml::default());
        assert_eq!(toml.completion.model, "gemini-2.0-flash");
        assert!(toml.completion.request_timeout().is_none());
        assert!(toml.analysis.enforce_contracts);
        assert_eq!(toml.analysis.excerpt_chars, 200);
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let toml = SbosToml::parse(
            r#"
[completion]
request_timeout_secs = 90

[logging]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(toml.completion.request_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(toml.completion.model, "gemini-2.0-flash");
        assert_eq!(toml.logging.format, LogFormat::Json);
        assert_eq!(toml.logging.level, "info");
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(SbosToml::parse("[analysis]\nenforce_contracts = \"yes\"").is_err());
    }

    #[test]
    fn test_save_and_load_preserves_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut toml = SbosToml::default();
        toml.completion.model = "gemini-2.5-flash".to_string();
        toml.delivery.webhook_url = Some("https://hooks.example.com/sbos".to_string());
        toml.save(&path).unwrap();

        assert_eq!(SbosToml::load(&path).unwrap(), toml);
    }

    #[test]
    fn test_validate_flags_zero_timeout() {
        let mut toml = SbosToml::default();
        assert!(toml.validate().is_empty());
        toml.completion.request_timeout_secs = Some(0);
        toml.completion.endpoint = "localhost".to_string();
        assert_eq!(toml.validate().len(), 2);
    }

    // =========================================
    // Environment and CLI layers
    // =========================================

    #[test]
    fn test_env_overrides_file() {
        let config = SbosConfig::from_parts(
            PathBuf::from("/project"),
            SbosToml::default(),
            env(&[
                ("SBOS_MODEL", "gemini-2.5-pro"),
                ("SBOS_REQUEST_TIMEOUT_SECS", "30"),
                ("GEMINI_API_KEY", "real-key"),
            ]),
        )
        .unwrap();
        assert_eq!(config.toml.completion.model, "gemini-2.5-pro");
        assert_eq!(config.runner_config().request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.require_api_key().unwrap(), "real-key");
    }

    #[test]
    fn test_invalid_timeout_env_is_an_error() {
        let result = SbosConfig::from_parts(
            PathBuf::from("/project"),
            SbosToml::default(),
            env(&[("SBOS_REQUEST_TIMEOUT_SECS", "soon")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_placeholder_key_counts_as_missing() {
        let config = SbosConfig::from_parts(
            PathBuf::from("/project"),
            SbosToml::default(),
            env(&[("GEMINI_API_KEY", "your_gemini_api_key_here")]),
        )
        .unwrap();
        assert!(!config.is_api_key_configured());
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_legacy_key_and_webhook_variables_are_fallbacks() {
        let config = SbosConfig::from_parts(
            PathBuf::from("/project"),
            SbosToml::default(),
            env(&[
                ("VITE_GEMINI_API_KEY", "legacy-key"),
                ("VITE_N8N_WEBHOOK_URL", "https://n8n.example.com/webhook/sbos"),
            ]),
        )
        .unwrap();
        assert_eq!(config.require_api_key().unwrap(), "legacy-key");
        assert_eq!(
            config.toml.delivery.webhook_url.as_deref(),
            Some("https://n8n.example.com/webhook/sbos")
        );
    }

    #[test]
    fn test_status_url_layers() {
        let toml = SbosToml::parse(
            "[delivery]\nstatus_url = \"https://n8n.example.com/status\"\npoll_interval_secs = 5\n",
        )
        .unwrap();
        assert_eq!(toml.delivery.poll_timeout_secs, 240);
        let options = toml.delivery.poll_options();
        assert_eq!(options.interval, Duration::from_secs(5));
        assert_eq!(options.timeout, Duration::from_secs(240));

        let config = SbosConfig::from_parts(
            PathBuf::from("/project"),
            toml.clone(),
            env(&[("VITE_N8N_STATUS_URL", "https://legacy.example.com/status")]),
        )
        .unwrap();
        assert_eq!(
            config.toml.delivery.status_url.as_deref(),
            Some("https://legacy.example.com/status")
        );

        let config = SbosConfig::from_parts(
            PathBuf::from("/project"),
            toml,
            env(&[
                ("SBOS_STATUS_URL", "https://sbos.example.com/status"),
                ("VITE_N8N_STATUS_URL", "https://legacy.example.com/status"),
            ]),
        )
        .unwrap();
        assert_eq!(
            config.toml.delivery.status_url.as_deref(),
            Some("https://sbos.example.com/status")
        );
    }

    #[test]
    fn test_blank_webhook_env_falls_back_to_legacy() {
        let config = SbosConfig::from_parts(
            PathBuf::from("/project"),
            SbosToml::default(),
            env(&[
                ("SBOS_WEBHOOK_URL", " "),
                ("VITE_N8N_WEBHOOK_URL", "https://n8n.example.com/webhook/sbos"),
            ]),
        )
        .unwrap();
        assert_eq!(
            config.toml.delivery.webhook_url.as_deref(),
            Some("https://n8n.example.com/webhook/sbos")
        );
    }

    #[test]
    fn test_custom_api_key_env_name() {
        let mut toml = SbosToml::default();
        toml.completion.api_key_env = "ACME_GEMINI_KEY".to_string();
        let config = SbosConfig::from_parts(
            PathBuf::from("/project"),
            toml,
            env(&[("ACME_GEMINI_KEY", "acme"), ("GEMINI_API_KEY", "ignored")]),
        )
        .unwrap();
        assert_eq!(config.require_api_key().unwrap(), "acme");
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = SbosConfig::from_parts(
            PathBuf::from("/project"),
            SbosToml::default(),
            env(&[("SBOS_MODEL", "from-env")]),
        )
        .unwrap()
        .with_model(Some("from-cli".to_string()))
        .with_request_timeout_secs(Some(5))
        .with_request_timeout_secs(None);
        assert_eq!(config.toml.completion.model, "from-cli");
        assert_eq!(config.toml.completion.request_timeout_secs, Some(5));
        assert_eq!(config.config_path(), PathBuf::from("/project/.sbos/sbos.toml"));
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
