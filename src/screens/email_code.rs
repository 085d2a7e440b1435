//! `login-passwordless-email-code` screen

use parking_lot::Mutex;

use crate::handoff::{ConsumeOutcome, Connection, HandoffChannel, SessionStorage};
use crate::navigation::{Navigator, back_to_identifier};
use crate::sdk::EmailCodeActions;

use super::{FormStatus, ScreenError, ScreenSettings, consume_handoff, text};

pub const MISSING_FIELDS: &str = "Email and code are required.";
pub const INVALID_CODE: &str = "Invalid code or email. Please try again.";
pub const RESEND_FAILED: &str = "Failed to resend code. Please try again later.";
pub const CODE_RESENT: &str = "Code resent to your email.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCodeTexts {
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub resend_text: String,
    pub back_text: String,
}

pub struct EmailCodeScreen<A, N> {
    sdk: A,
    navigator: N,
    identifier_path: String,
    handoff: ConsumeOutcome,
    email: String,
    status: Mutex<FormStatus>,
}

impl<A, N> EmailCodeScreen<A, N>
where
    A: EmailCodeActions,
    N: Navigator,
{
    pub fn new<S: SessionStorage>(
        sdk: A,
        navigator: N,
        channel: &HandoffChannel<S>,
        settings: &ScreenSettings,
    ) -> Self {
        let handoff = consume_handoff(
            channel,
            &navigator,
            settings,
            Connection::Email,
            sdk.transaction_state(),
        );
        let email = match &handoff {
            ConsumeOutcome::Prefill { username } => username.clone(),
            _ => sdk.snapshot().prefilled_username(),
        };

        Self {
            sdk,
            navigator,
            identifier_path: settings.identifier_path.clone(),
            handoff,
            email,
            status: Mutex::new(FormStatus::default()),
        }
    }

    pub fn is_redirecting(&self) -> bool {
        self.handoff.is_redirecting()
    }

    /// Address the code was sent to (read-only on the form)
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn status(&self) -> FormStatus {
        self.status.lock().clone()
    }

    pub fn texts(&self) -> EmailCodeTexts {
        let screen = self.sdk.screen();
        let recipient = if self.email.is_empty() {
            "your email"
        } else {
            self.email.as_str()
        };
        EmailCodeTexts {
            title: text(screen, "title", "Continue with Email Code"),
            description: text(
                screen,
                "description",
                &format!("Enter the code sent to {}.", recipient),
            ),
            button_text: text(screen, "buttonText", "Continue"),
            resend_text: text(screen, "resendActionText", "Resend Code"),
            back_text: text(screen, "backText", "Back to sign-in options"),
        }
    }

    pub async fn submit_code(&self, code: &str) -> Result<(), ScreenError> {
        if self.is_redirecting() {
            return Err(ScreenError::Redirecting);
        }
        self.status.lock().clear();

        let code = code.trim();
        if self.email.is_empty() || code.is_empty() {
            self.status.lock().error = Some(MISSING_FIELDS.to_string());
            return Err(ScreenError::Invalid(MISSING_FIELDS.to_string()));
        }

        match self.sdk.submit_code(&self.email, code).await {
            Ok(()) => {
                self.status.lock().success = true;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Email code submission failed: {}", e);
                self.status.lock().error = Some(INVALID_CODE.to_string());
                Err(e.into())
            }
        }
    }

    pub async fn resend_code(&self) -> Result<(), ScreenError> {
        self.status.lock().clear();
        match self.sdk.resend_code().await {
            Ok(()) => {
                self.status.lock().notice = Some(CODE_RESENT.to_string());
                Ok(())
            }
            Err(e) => {
                tracing::error!("Email code resend failed: {}", e);
                self.status.lock().error = Some(RESEND_FAILED.to_string());
                Err(e.into())
            }
        }
    }

    /// Return to the identifier screen to pick another method
    pub fn back_to_options(&self) -> Result<(), ScreenError> {
        let fallback = self.sdk.screen().links.edit_identifier.as_deref();
        back_to_identifier(&self.navigator, &self.identifier_path, fallback)
            .map_err(ScreenError::Navigation)
    }
}
