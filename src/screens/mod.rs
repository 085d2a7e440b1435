//! Headless controllers for the customized hosted-flow screens
//!
//! Each controller owns what its page needs (texts with defaults, the
//! pre-filled identifier, the form status) and forwards submissions to the
//! SDK. Rendering is left to the page.

use std::fmt;

use crate::handoff::{
    ConsumeOutcome, Connection, HandoffChannel, HandoffConsumer, ProduceError, SessionStorage,
};
use crate::methods::{FallbackDefaults, LookupError};
use crate::model::config::{Config, LookupFailurePolicy};
use crate::navigation::{NavigationError, Navigator};
use crate::sdk::{ScreenData, SdkError};

pub mod email_code;
pub mod login_id;
pub mod login_password;
pub mod mfa;
pub mod signup;
pub mod sms_otp;

pub use email_code::EmailCodeScreen;
pub use login_id::LoginIdScreen;
pub use login_password::LoginPasswordScreen;
pub use mfa::{MfaPhoneEnrollmentScreen, MfaSmsChallengeScreen};
pub use signup::{SignupIdScreen, SignupPasswordScreen};
pub use sms_otp::SmsOtpScreen;

/// Shown when an SDK action fails and the screen has no more specific message
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// Screen behavior settings
#[derive(Debug, Clone)]
pub struct ScreenSettings {
    pub lookup_failure_policy: LookupFailurePolicy,
    pub fallback: FallbackDefaults,
    /// Connection-switch form target; the current URL when unset
    pub switch_connection_path: Option<String>,
    pub identifier_path: String,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ScreenSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            lookup_failure_policy: config.lookup_failure_policy,
            fallback: FallbackDefaults::from_config(config),
            switch_connection_path: config.switch_connection_path.clone(),
            identifier_path: config.identifier_path.clone(),
        }
    }
}

/// User-visible state of a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub error: Option<String>,
    /// Informational message (code resent, fallback methods shown)
    pub notice: Option<String>,
    pub success: bool,
}

impl FormStatus {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Screen operation error types
#[derive(Debug)]
pub enum ScreenError {
    /// Input rejected before reaching the SDK
    Invalid(String),
    /// The screen is switching connection and takes no input
    Redirecting,
    Lookup(LookupError),
    Handoff(ProduceError),
    Sdk(SdkError),
    Navigation(NavigationError),
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "Invalid input: {}", msg),
            Self::Redirecting => write!(f, "Screen is redirecting"),
            Self::Lookup(e) => write!(f, "{}", e),
            Self::Handoff(e) => write!(f, "{}", e),
            Self::Sdk(e) => write!(f, "{}", e),
            Self::Navigation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ScreenError {}

impl From<SdkError> for ScreenError {
    fn from(e: SdkError) -> Self {
        Self::Sdk(e)
    }
}

impl From<NavigationError> for ScreenError {
    fn from(e: NavigationError) -> Self {
        Self::Navigation(e)
    }
}

/// Tenant text for `key`, or `default` when the tenant has none
pub(crate) fn text(screen: &ScreenData, key: &str, default: &str) -> String {
    screen
        .texts
        .get(key)
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Run the hand-off consumer for a screen whose native connection is `native`
pub(crate) fn consume_handoff<S: SessionStorage, N: Navigator>(
    channel: &HandoffChannel<S>,
    navigator: &N,
    settings: &ScreenSettings,
    native: Connection,
    transaction_state: &str,
) -> ConsumeOutcome {
    HandoffConsumer::new(channel, navigator, native)
        .with_switch_action(settings.switch_connection_path.as_deref())
        .on_first_render(transaction_state)
}
