use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::submit::SubmissionPolicy;

/// Config file read when `--config` is not given. Optional.
pub const DEFAULT_CONFIG_PATH: &str = "./config/ask.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_endpoint() -> String {
    "/ask".to_string()
}

impl ServiceConfig {
    /// Full URL of the answer endpoint.
    pub fn ask_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid service.base_url: {}", self.base_url))?;
        base.join(&self.endpoint)
            .with_context(|| format!("Invalid service.endpoint: {}", self.endpoint))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClientConfig {
    /// How overlapping submissions settle.
    #[serde(default)]
    pub policy: SubmissionPolicy,
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load `path` if given; otherwise load [`DEFAULT_CONFIG_PATH`] when it
/// exists, falling back to [`Config::minimal`].
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => load_config(p),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_config(&default_path)
            } else {
                Ok(Config::minimal())
            }
        }
    }
}

/// Checks invariants that serde cannot express. Also run after CLI overrides.
pub fn validate(config: &Config) -> Result<()> {
    let base = Url::parse(&config.service.base_url)
        .with_context(|| format!("Invalid service.base_url: {}", config.service.base_url))?;

    match base.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!(
            "service.base_url must use http or https, got '{}'",
            other
        ),
    }

    // `endpoint` is joined as an absolute path and replaces any base path.
    if base.path() != "/" {
        anyhow::bail!(
            "service.base_url must not contain a path (got '{}'); put it in service.endpoint",
            base.path()
        );
    }

    if !config.service.endpoint.starts_with('/') {
        anyhow::bail!(
            "service.endpoint must start with '/', got '{}'",
            config.service.endpoint
        );
    }

    config.service.ask_url()?;
    Ok(())
}
