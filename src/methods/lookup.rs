//! Methods lookup: which sign-in methods an identifier can use
//!
//! Lookups go to an external endpoint. When it can't be reached the
//! identifier screen either falls back to a static default list or blocks,
//! depending on [`LookupFailurePolicy`].

#![allow(async_fn_in_trait)]

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::handoff::intent::{is_email_shaped, is_phone_shaped};
use crate::model::config::{
    Config, LookupFailurePolicy, default_fallback_email, default_fallback_phone,
};

use super::types::{LookupResponse, Method};

/// Non-blocking warning shown above the fallback method list
pub const FALLBACK_WARNING: &str =
    "We couldn't check your sign-in options, so the default ones are shown.";

/// Blocking error shown when fallback is disabled
pub const BLOCKED_MESSAGE: &str =
    "We couldn't load your sign-in options. Please try again in a moment.";

/// Methods-lookup error types
#[derive(Debug)]
pub enum LookupError {
    /// No lookup endpoint configured
    NotConfigured,
    /// Network failure or timeout
    Request(String),
    /// Non-2xx response
    Status { status: u16, body: String },
    /// Response body is not a lookup response
    Decode(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Methods lookup endpoint not configured"),
            Self::Request(msg) => write!(f, "Methods lookup request failed: {}", msg),
            Self::Status { status, body } => {
                write!(f, "Methods lookup failed (status {}): {}", status, body)
            }
            Self::Decode(msg) => write!(f, "Methods lookup response invalid: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

/// Source of sign-in methods for an identifier
pub trait MethodsLookup {
    async fn lookup(&self, identifier: &str) -> Result<LookupResponse, LookupError>;
}

/// Canonical values used when the lookup can't be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackDefaults {
    pub email: String,
    pub phone: String,
}

impl Default for FallbackDefaults {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl FallbackDefaults {
    /// Configured values, or the built-in ones when a key is unset
    pub fn from_config(config: &Config) -> Self {
        Self {
            email: config
                .fallback_email
                .clone()
                .or_else(default_fallback_email)
                .unwrap_or_default(),
            phone: config
                .fallback_phone
                .clone()
                .or_else(default_fallback_phone)
                .unwrap_or_default(),
        }
    }
}

/// Static method list: password, then an email code, then an SMS code
///
/// Each passwordless entry uses the identifier when it has the right shape,
/// otherwise the canonical default. A misconfigured default is skipped.
pub fn fallback_methods(identifier: &str, defaults: &FallbackDefaults) -> Vec<Method> {
    let identifier = identifier.trim();
    let mut methods = vec![Method::password()];

    if is_email_shaped(identifier) {
        methods.push(Method::passwordless_email(identifier));
    } else if is_email_shaped(&defaults.email) {
        methods.push(Method::passwordless_email(defaults.email.trim()));
    } else {
        tracing::warn!("Fallback email {:?} is not an email address, skipping", defaults.email);
    }

    if is_phone_shaped(identifier) {
        methods.push(Method::passwordless_phone(identifier));
    } else if is_phone_shaped(&defaults.phone) {
        methods.push(Method::passwordless_phone(defaults.phone.trim()));
    } else {
        tracing::warn!("Fallback phone {:?} is not a phone number, skipping", defaults.phone);
    }

    methods
}

/// Where a resolved method list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodsSource {
    Endpoint,
    Fallback,
}

/// Method list ready to be rendered as choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMethods {
    /// Identifier as normalized by the endpoint, else as typed
    pub identifier: String,
    pub methods: Vec<Method>,
    pub password_login_username: Option<String>,
    pub source: MethodsSource,
    /// Non-blocking warning to display with the choices
    pub warning: Option<String>,
}

impl ResolvedMethods {
    /// Username to resume the password connection with
    pub fn password_username(&self) -> &str {
        self.password_login_username
            .as_deref()
            .unwrap_or(&self.identifier)
    }
}

/// Look up methods for `identifier`, applying the failure policy
///
/// An empty method list from the endpoint counts as a failure: the user must
/// never be left without options.
pub async fn resolve_methods<L: MethodsLookup>(
    lookup: &L,
    identifier: &str,
    policy: LookupFailurePolicy,
    defaults: &FallbackDefaults,
) -> Result<ResolvedMethods, LookupError> {
    let failure = match lookup.lookup(identifier).await {
        Ok(response) if !response.methods.is_empty() => {
            tracing::debug!(
                "Methods lookup returned {} method(s)",
                response.methods.len()
            );
            let identifier = response
                .identifier
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| identifier.to_string());
            return Ok(ResolvedMethods {
                identifier,
                methods: response.methods,
                password_login_username: response
                    .password_login_username
                    .filter(|u| !u.trim().is_empty()),
                source: MethodsSource::Endpoint,
                warning: None,
            });
        }
        Ok(_) => LookupError::Decode("no methods returned".to_string()),
        Err(e) => e,
    };

    match policy {
        LookupFailurePolicy::Fallback => {
            tracing::warn!("{}, using default methods", failure);
            Ok(ResolvedMethods {
                identifier: identifier.to_string(),
                methods: fallback_methods(identifier, defaults),
                password_login_username: None,
                source: MethodsSource::Fallback,
                warning: Some(FALLBACK_WARNING.to_string()),
            })
        }
        LookupFailurePolicy::Block => {
            tracing::warn!("{}", failure);
            Err(failure)
        }
    }
}

/// Guards against stale lookup responses
///
/// Every submission takes a new generation; a response is only applied if its
/// generation is still the latest one.
#[derive(Debug, Default)]
pub struct LookupGeneration {
    current: AtomicU64,
}

impl LookupGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current.load(Ordering::SeqCst) == generation
    }
}

pub use remote::HttpMethodsLookup;

mod remote {
    use reqwest::Client;

    use crate::model::config::Config;

    use super::{LookupError, MethodsLookup};
    use crate::methods::types::{LookupRequest, LookupResponse};

    /// Methods lookup over HTTP
    ///
    /// Native builds go through the configured proxy and timeout; in the
    /// browser reqwest sends the request with `fetch`.
    pub struct HttpMethodsLookup {
        client: Client,
        url: Option<String>,
        api_key: Option<String>,
    }

    impl HttpMethodsLookup {
        pub fn new(client: Client, url: Option<String>, api_key: Option<String>) -> Self {
            Self {
                client,
                url,
                api_key,
            }
        }

        /// Build from config: endpoint, key, proxy, TLS backend and timeout
        #[cfg(not(target_arch = "wasm32"))]
        pub fn from_config(config: &Config) -> anyhow::Result<Self> {
            use crate::http_client::{ProxyConfig, build_client};

            let proxy = ProxyConfig::from_config(config);
            let client = build_client(
                proxy.as_ref(),
                config.lookup_timeout_secs,
                config.tls_backend,
            )?;
            Ok(Self::new(
                client,
                config.lookup_url.clone(),
                config.effective_lookup_api_key().map(str::to_string),
            ))
        }

        /// Build from config: endpoint and key; the browser owns transport settings
        #[cfg(target_arch = "wasm32")]
        pub fn from_config(config: &Config) -> anyhow::Result<Self> {
            Ok(Self::new(
                Client::new(),
                config.lookup_url.clone(),
                config.effective_lookup_api_key().map(str::to_string),
            ))
        }
    }

    impl MethodsLookup for HttpMethodsLookup {
        async fn lookup(&self, identifier: &str) -> Result<LookupResponse, LookupError> {
            let url = self.url.as_deref().ok_or(LookupError::NotConfigured)?;

            let mut request = self.client.post(url).json(&LookupRequest {
                identifier: identifier.to_string(),
            });
            if let Some(key) = &self.api_key {
                request = request.header("x-api-key", key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| LookupError::Request(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LookupError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            response
                .json::<LookupResponse>()
                .await
                .map_err(|e| LookupError::Decode(e.to_string()))
        }
    }
}
