//! `login-password` screen

use parking_lot::Mutex;

use crate::handoff::{ConsumeOutcome, Connection, HandoffChannel, SessionStorage};
use crate::navigation::Navigator;
use crate::sdk::LoginPasswordActions;

use super::{FormStatus, GENERIC_ERROR, ScreenError, ScreenSettings, consume_handoff, text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPasswordTexts {
    pub title: String,
    pub description: String,
    pub password_placeholder: String,
    pub button_text: String,
    pub forgot_password_text: String,
    pub edit_email_text: String,
    pub email_placeholder: String,
}

pub struct LoginPasswordScreen<A, N> {
    sdk: A,
    navigator: N,
    handoff: ConsumeOutcome,
    identifier: String,
    status: Mutex<FormStatus>,
}

impl<A, N> LoginPasswordScreen<A, N>
where
    A: LoginPasswordActions,
    N: Navigator,
{
    /// First render: consume any pending hand-off before showing the form
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
            Connection::Password,
            sdk.transaction_state(),
        );
        let identifier = match &handoff {
            ConsumeOutcome::Prefill { username } => username.clone(),
            _ => sdk.snapshot().prefilled_username(),
        };

        Self {
            sdk,
            navigator,
            handoff,
            identifier,
            status: Mutex::new(FormStatus::default()),
        }
    }

    /// Connection switch in flight; the password form must stay hidden
    pub fn is_redirecting(&self) -> bool {
        self.handoff.is_redirecting()
    }

    pub fn handoff(&self) -> &ConsumeOutcome {
        &self.handoff
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn status(&self) -> FormStatus {
        self.status.lock().clone()
    }

    pub fn texts(&self) -> LoginPasswordTexts {
        let screen = self.sdk.screen();
        LoginPasswordTexts {
            title: text(screen, "title", "Enter Your Password"),
            description: text(screen, "description", "Enter your password to continue"),
            password_placeholder: text(screen, "passwordPlaceholder", "Password"),
            button_text: text(screen, "buttonText", "Continue"),
            forgot_password_text: text(screen, "forgotPasswordText", "Forgot your Password?"),
            edit_email_text: text(screen, "editEmailText", "Edit Email"),
            email_placeholder: text(screen, "emailPlaceholder", "Email"),
        }
    }

    pub fn reset_password_link(&self) -> Option<&str> {
        self.sdk.screen().links.reset_password.as_deref()
    }

    /// Leave for the identifier screen through the SDK's edit link
    pub fn edit_identifier(&self) -> Result<(), ScreenError> {
        let link = self.sdk.screen().links.edit_identifier.as_deref();
        let result = match link.filter(|l| !l.is_empty()) {
            Some(href) => self.navigator.assign(href),
            None => self.navigator.back(),
        };
        result.map_err(ScreenError::Navigation)
    }

    pub async fn submit(&self, password: &str) -> Result<(), ScreenError> {
        if self.is_redirecting() {
            return Err(ScreenError::Redirecting);
        }
        self.status.lock().clear();

        if password.is_empty() {
            let msg = "Password is required.".to_string();
            self.status.lock().error = Some(msg.clone());
            return Err(ScreenError::Invalid(msg));
        }

        match self.sdk.login(&self.identifier, password).await {
            Ok(()) => {
                self.status.lock().success = true;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Password login failed: {}", e);
                self.status.lock().error = Some(GENERIC_ERROR.to_string());
                Err(e.into())
            }
        }
    }
}
