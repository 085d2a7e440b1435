use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TlsBackend {
    #[default]
    Rustls,
    NativeTls,
}

/// What the identifier screen does when the methods lookup fails
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LookupFailurePolicy {
    /// Show the static default method list with a non-blocking warning
    #[default]
    Fallback,
    /// Keep the user on the identifier form with an error
    Block,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Bind host of the development methods-lookup server
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Methods-lookup endpoint (optional, lookups fail over to defaults without it)
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_url: Option<String>,

    /// Key sent as `x-api-key` to the lookup endpoint; the dev server requires it when set
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_api_key: Option<String>,

    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,

    #[serde(default)]
    pub lookup_failure_policy: LookupFailurePolicy,

    /// Canonical email offered by the fallback list when the identifier is not an email
    #[serde(default = "default_fallback_email")]
    pub fallback_email: Option<String>,

    /// Canonical phone number offered by the fallback list when the identifier is not a phone number
    #[serde(default = "default_fallback_phone")]
    pub fallback_phone: Option<String>,

    #[serde(default)]
    pub tls_backend: TlsBackend,

    /// HTTP proxy URL (optional)
    /// Supported formats: http://host:port, https://host:port, socks5://host:port
    #[serde(default)]
    pub proxy_url: Option<String>,

    #[serde(default)]
    pub proxy_username: Option<String>,

    #[serde(default)]
    pub proxy_password: Option<String>,

    /// Target of the connection-switch form; the current screen URL is used when unset
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_connection_path: Option<String>,

    /// Hosted-flow path of the identifier screen, used by "back to sign-in options"
    #[serde(default = "default_identifier_path")]
    pub identifier_path: String,

    /// Rules file served by the development lookup server
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods_file: Option<String>,

    /// Config file path (runtime metadata, not written to JSON)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

pub(crate) fn default_fallback_email() -> Option<String> {
    Some("contact@example.com".to_string())
}

pub(crate) fn default_fallback_phone() -> Option<String> {
    Some("+33663936646".to_string())
}

fn default_identifier_path() -> String {
    "/u/login/identifier".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            lookup_url: None,
            lookup_api_key: None,
            lookup_timeout_secs: default_lookup_timeout_secs(),
            lookup_failure_policy: LookupFailurePolicy::default(),
            fallback_email: default_fallback_email(),
            fallback_phone: default_fallback_phone(),
            tls_backend: TlsBackend::default(),
            proxy_url: None,
            proxy_username: None,
            proxy_password: None,
            switch_connection_path: None,
            identifier_path: default_identifier_path(),
            methods_file: None,
            config_path: None,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            // Config file doesn't exist, return default config
            let mut config = Self::default();
            config.config_path = Some(path.to_path_buf());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get config file path (if available)
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Write current config back to original config file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = self
            .config_path
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Config file path unknown, cannot save config"))?;

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Lookup API key, ignoring blank values
    pub fn effective_lookup_api_key(&self) -> Option<&str> {
        self.lookup_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
