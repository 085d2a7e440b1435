//! Identity SDK capability surface
//!
//! The hosted flow hands every screen a context object (screen data, texts,
//! transaction state) and a set of actions that post back to the flow engine.
//! Screens only see these traits, so a fake SDK can drive them in tests.

#![allow(async_fn_in_trait)]

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Data the flow engine pre-populates for a screen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: ScreenFields,
    /// Localized texts keyed by the tenant's text keys
    #[serde(default)]
    pub texts: HashMap<String, String>,
    #[serde(default)]
    pub links: ScreenLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenFields {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenLinks {
    #[serde(default)]
    pub signup: Option<String>,
    #[serde(default)]
    pub reset_password: Option<String>,
    #[serde(default)]
    pub edit_identifier: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub login: Option<String>,
}

/// Error reported by the flow engine for the current transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    /// Opaque token of the in-progress hosted login
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub errors: Vec<TransactionError>,
}

/// Values the user submitted on the previous round trip, echoed back unverified
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntrustedData {
    #[serde(default)]
    pub submitted_form_data: SubmittedFormData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmittedFormData {
    #[serde(default)]
    pub username: Option<String>,
}

/// Everything a screen reads from the SDK on render
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSnapshot {
    #[serde(default)]
    pub screen: ScreenData,
    #[serde(default)]
    pub transaction: TransactionData,
    #[serde(default)]
    pub untrusted_data: UntrustedData,
}

impl ScreenSnapshot {
    /// Identifier to pre-fill: screen data first, then the unverified echo
    pub fn prefilled_username(&self) -> String {
        self.screen
            .data
            .username
            .clone()
            .or_else(|| self.untrusted_data.submitted_form_data.username.clone())
            .unwrap_or_default()
    }
}

/// Rejection of an SDK action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The flow engine answered with an error
    Rejected(String),
    /// The action could not reach the flow engine
    Transport(String),
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkError::Rejected(msg) => write!(f, "Action rejected: {}", msg),
            SdkError::Transport(msg) => write!(f, "Action transport failed: {}", msg),
        }
    }
}

impl std::error::Error for SdkError {}

pub type SdkResult<T> = Result<T, SdkError>;

/// Read access to the screen context
pub trait ScreenContext {
    fn snapshot(&self) -> &ScreenSnapshot;

    fn screen(&self) -> &ScreenData {
        &self.snapshot().screen
    }

    fn transaction_state(&self) -> &str {
        &self.snapshot().transaction.state
    }
}

/// `login-id` screen actions
pub trait LoginIdActions: ScreenContext {
    async fn login(&self, username: &str) -> SdkResult<()>;
    /// Redirect to a third-party identity provider
    async fn federated_login(&self, connection: &str, login_hint: Option<&str>) -> SdkResult<()>;
}

/// `login-password` screen actions
pub trait LoginPasswordActions: ScreenContext {
    async fn login(&self, username: &str, password: &str) -> SdkResult<()>;
}

/// `login-passwordless-email-code` screen actions
pub trait EmailCodeActions: ScreenContext {
    async fn submit_code(&self, email: &str, code: &str) -> SdkResult<()>;
    async fn resend_code(&self) -> SdkResult<()>;
}

/// `login-passwordless-sms-otp` screen actions
pub trait SmsOtpActions: ScreenContext {
    async fn submit_otp(&self, username: &str, code: &str) -> SdkResult<()>;
    async fn resend_otp(&self) -> SdkResult<()>;
}

/// Delivery channel for phone factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneChannel {
    Sms,
    Voice,
}

/// `mfa-phone-enrollment` screen actions
pub trait MfaPhoneEnrollmentActions: ScreenContext {
    async fn continue_enrollment(&self, phone: &str, channel: PhoneChannel) -> SdkResult<()>;
}

/// `mfa-sms-challenge` screen actions
pub trait MfaSmsChallengeActions: ScreenContext {
    async fn continue_mfa_sms_challenge(&self, code: &str) -> SdkResult<()>;
}

/// Fields submitted by the signup screens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupParams {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// `signup-id` / `signup-password` screen actions
pub trait SignupActions: ScreenContext {
    async fn signup(&self, params: SignupParams) -> SdkResult<()>;
}
