//! MFA phone screens: `mfa-phone-enrollment` and `mfa-sms-challenge`

use parking_lot::Mutex;

use crate::sdk::{MfaPhoneEnrollmentActions, MfaSmsChallengeActions, PhoneChannel, ScreenData};

use super::{FormStatus, GENERIC_ERROR, ScreenError, text};

/// Tenant texts shared by both MFA phone screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaTexts {
    pub title: String,
    pub description: String,
    pub placeholder: String,
    pub button_text: String,
}

fn mfa_texts(screen: &ScreenData, title: &str, description: &str, placeholder: &str) -> MfaTexts {
    MfaTexts {
        title: text(screen, "title", title),
        description: text(screen, "description", description),
        placeholder: text(screen, "placeholder", placeholder),
        button_text: text(screen, "continueButtonText", "Continue"),
    }
}

fn record_failure(status: &Mutex<FormStatus>, action: &str, e: &dyn std::fmt::Display) {
    tracing::error!("{} failed: {}", action, e);
    status.lock().error = Some(GENERIC_ERROR.to_string());
}

pub struct MfaPhoneEnrollmentScreen<A> {
    sdk: A,
    status: Mutex<FormStatus>,
}

impl<A: MfaPhoneEnrollmentActions> MfaPhoneEnrollmentScreen<A> {
    pub fn new(sdk: A) -> Self {
        Self {
            sdk,
            status: Mutex::new(FormStatus::default()),
        }
    }

    pub fn texts(&self) -> MfaTexts {
        mfa_texts(
            self.sdk.screen(),
            "Secure your account",
            "Enter your phone number to receive verification codes.",
            "Phone number",
        )
    }

    /// Number to pre-fill: the known phone, then the identifier
    pub fn prefilled_phone(&self) -> String {
        self.sdk
            .screen()
            .data
            .phone_number
            .clone()
            .unwrap_or_else(|| self.sdk.snapshot().prefilled_username())
    }

    pub fn status(&self) -> FormStatus {
        self.status.lock().clone()
    }

    /// Enroll `phone` for SMS codes
    pub async fn submit(&self, phone: &str) -> Result<(), ScreenError> {
        self.status.lock().clear();
        let phone = phone.trim();
        if phone.is_empty() {
            let msg = "Phone number is required.".to_string();
            self.status.lock().error = Some(msg.clone());
            return Err(ScreenError::Invalid(msg));
        }

        match self.sdk.continue_enrollment(phone, PhoneChannel::Sms).await {
            Ok(()) => {
                self.status.lock().success = true;
                Ok(())
            }
            Err(e) => {
                record_failure(&self.status, "MFA phone enrollment", &e);
                Err(e.into())
            }
        }
    }
}

pub struct MfaSmsChallengeScreen<A> {
    sdk: A,
    status: Mutex<FormStatus>,
}

impl<A: MfaSmsChallengeActions> MfaSmsChallengeScreen<A> {
    pub fn new(sdk: A) -> Self {
        Self {
            sdk,
            status: Mutex::new(FormStatus::default()),
        }
    }

    pub fn texts(&self) -> MfaTexts {
        mfa_texts(
            self.sdk.screen(),
            "Verify your identity",
            "Enter the code we sent to your phone.",
            "Enter the 6-digit code",
        )
    }

    /// Phone the challenge was sent to, as masked by the flow engine
    pub fn phone_number(&self) -> Option<&str> {
        self.sdk.screen().data.phone_number.as_deref()
    }

    pub fn status(&self) -> FormStatus {
        self.status.lock().clone()
    }

    pub async fn submit(&self, code: &str) -> Result<(), ScreenError> {
        self.status.lock().clear();
        let code = code.trim();
        if code.is_empty() {
            let msg = "Code is required.".to_string();
            self.status.lock().error = Some(msg.clone());
            return Err(ScreenError::Invalid(msg));
        }

        match self.sdk.continue_mfa_sms_challenge(code).await {
            Ok(()) => {
                self.status.lock().success = true;
                Ok(())
            }
            Err(e) => {
                record_failure(&self.status, "MFA SMS challenge", &e);
                Err(e.into())
            }
        }
    }
}
