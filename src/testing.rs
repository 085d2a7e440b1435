//! Test doubles for the SDK and the methods lookup

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use crate::methods::lookup::{LookupError, MethodsLookup};
use crate::methods::types::LookupResponse;
use crate::sdk::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SdkCall {
    Login { username: String },
    PasswordLogin { username: String, password: String },
    FederatedLogin { connection: String, login_hint: Option<String> },
    SubmitCode { email: String, code: String },
    ResendCode,
    SubmitOtp { username: String, code: String },
    ResendOtp,
    ContinueEnrollment { phone: String, channel: PhoneChannel },
    ContinueMfaSmsChallenge { code: String },
    Signup(SignupParams),
}

/// SDK that records every action and answers with a configurable result
pub(crate) struct FakeSdk {
    snapshot: ScreenSnapshot,
    calls: Mutex<Vec<SdkCall>>,
    failure: Mutex<Option<SdkError>>,
}

impl FakeSdk {
    pub(crate) fn new(state: &str) -> Self {
        let mut snapshot = ScreenSnapshot::default();
        snapshot.transaction.state = state.to_string();
        Self::with_snapshot(snapshot)
    }

    pub(crate) fn with_snapshot(snapshot: ScreenSnapshot) -> Self {
        Self {
            snapshot,
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    pub(crate) fn with_username(mut self, username: &str) -> Self {
        self.snapshot.screen.data.username = Some(username.to_string());
        self
    }

    pub(crate) fn with_text(mut self, key: &str, value: &str) -> Self {
        self.snapshot
            .screen
            .texts
            .insert(key.to_string(), value.to_string());
        self
    }

    pub(crate) fn fail_with(&self, error: SdkError) {
        *self.failure.lock() = Some(error);
    }

    pub(crate) fn succeed(&self) {
        *self.failure.lock() = None;
    }

    pub(crate) fn calls(&self) -> Vec<SdkCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: SdkCall) -> SdkResult<()> {
        self.calls.lock().push(call);
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ScreenContext for FakeSdk {
    fn snapshot(&self) -> &ScreenSnapshot {
        &self.snapshot
    }
}

impl LoginIdActions for FakeSdk {
    async fn login(&self, username: &str) -> SdkResult<()> {
        self.record(SdkCall::Login {
            username: username.to_string(),
        })
    }

    async fn federated_login(&self, connection: &str, login_hint: Option<&str>) -> SdkResult<()> {
        self.record(SdkCall::FederatedLogin {
            connection: connection.to_string(),
            login_hint: login_hint.map(str::to_string),
        })
    }
}

impl LoginPasswordActions for FakeSdk {
    async fn login(&self, username: &str, password: &str) -> SdkResult<()> {
        self.record(SdkCall::PasswordLogin {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl EmailCodeActions for FakeSdk {
    async fn submit_code(&self, email: &str, code: &str) -> SdkResult<()> {
        self.record(SdkCall::SubmitCode {
            email: email.to_string(),
            code: code.to_string(),
        })
    }

    async fn resend_code(&self) -> SdkResult<()> {
        self.record(SdkCall::ResendCode)
    }
}

impl SmsOtpActions for FakeSdk {
    async fn submit_otp(&self, username: &str, code: &str) -> SdkResult<()> {
        self.record(SdkCall::SubmitOtp {
            username: username.to_string(),
            code: code.to_string(),
        })
    }

    async fn resend_otp(&self) -> SdkResult<()> {
        self.record(SdkCall::ResendOtp)
    }
}

impl MfaPhoneEnrollmentActions for FakeSdk {
    async fn continue_enrollment(&self, phone: &str, channel: PhoneChannel) -> SdkResult<()> {
        self.record(SdkCall::ContinueEnrollment {
            phone: phone.to_string(),
            channel,
        })
    }
}

impl MfaSmsChallengeActions for FakeSdk {
    async fn continue_mfa_sms_challenge(&self, code: &str) -> SdkResult<()> {
        self.record(SdkCall::ContinueMfaSmsChallenge {
            code: code.to_string(),
        })
    }
}

impl SignupActions for FakeSdk {
    async fn signup(&self, params: SignupParams) -> SdkResult<()> {
        self.record(SdkCall::Signup(params))
    }
}

/// Lookup with a fixed answer and optional per-call delays
pub(crate) struct ScriptedLookup {
    response: Option<LookupResponse>,
    delays: Mutex<VecDeque<Duration>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    pub(crate) fn responding(response: LookupResponse) -> Self {
        Self {
            response: Some(response),
            delays: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails like a network error
    pub(crate) fn failing() -> Self {
        Self {
            response: None,
            delays: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delay the next calls, in order
    pub(crate) fn with_delays(self, delays: &[Duration]) -> Self {
        self.delays.lock().extend(delays.iter().copied());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl MethodsLookup for ScriptedLookup {
    async fn lookup(&self, identifier: &str) -> Result<LookupResponse, LookupError> {
        self.calls.lock().push(identifier.to_string());
        let delay = self.delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.response
            .clone()
            .ok_or_else(|| LookupError::Request("connection refused".to_string()))
    }
}
