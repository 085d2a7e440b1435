//! Development lookup server types

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::methods::{FallbackDefaults, LookupResponse, Method, fallback_methods};

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                error_type: error_type.into(),
                message: message.into(),
            },
        }
    }

    pub fn authentication_error() -> Self {
        Self::new("authentication_error", "Invalid API key")
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new("invalid_request_error", message)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rules: usize,
}

/// One rule of the methods file
///
/// A rule matches an exact identifier (case-insensitive) or every email
/// address of a domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_login_username: Option<String>,
}

impl MethodRule {
    fn matches(&self, identifier: &str) -> bool {
        if let Some(expected) = &self.identifier {
            return expected.trim().eq_ignore_ascii_case(identifier);
        }
        match (&self.domain, identifier.rsplit_once('@')) {
            (Some(domain), Some((_, host))) => {
                domain.trim_start_matches('@').eq_ignore_ascii_case(host)
            }
            _ => false,
        }
    }
}

/// Methods file served by `POST /methods`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRules {
    #[serde(default)]
    pub rules: Vec<MethodRule>,
    /// Answer for identifiers no rule matches; the static default list when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_methods: Option<Vec<Method>>,
}

impl MethodRules {
    /// Load rules from file; no file means no rules
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Methods file {} not found, serving defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read methods file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse methods file: {}", path.display()))
    }

    /// Lookup answer for `identifier`: first matching rule, else the defaults
    pub fn resolve(&self, identifier: &str) -> LookupResponse {
        let identifier = identifier.trim();
        if let Some(rule) = self.rules.iter().find(|r| r.matches(identifier)) {
            return LookupResponse {
                methods: rule.methods.clone(),
                identifier: Some(identifier.to_string()),
                password_login_username: rule.password_login_username.clone(),
            };
        }

        let methods = self
            .default_methods
            .clone()
            .unwrap_or_else(|| fallback_methods(identifier, &FallbackDefaults::default()));
        LookupResponse {
            methods,
            identifier: Some(identifier.to_string()),
            password_login_username: None,
        }
    }
}
