//! Signup screens: `signup-id` and `signup-password`

use parking_lot::Mutex;

use crate::sdk::{SignupActions, SignupParams};

use super::{FormStatus, GENERIC_ERROR, ScreenError, text};

pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupIdTexts {
    pub title: String,
    pub description: String,
    pub placeholder: String,
    pub button_text: String,
    pub footer_text: String,
    pub footer_link_text: String,
}

pub struct SignupIdScreen<A> {
    sdk: A,
    status: Mutex<FormStatus>,
}

impl<A: SignupActions> SignupIdScreen<A> {
    pub fn new(sdk: A) -> Self {
        Self {
            sdk,
            status: Mutex::new(FormStatus::default()),
        }
    }

    pub fn texts(&self) -> SignupIdTexts {
        let screen = self.sdk.screen();
        SignupIdTexts {
            title: text(screen, "title", "Create your account"),
            description: text(
                screen,
                "description",
                "Enter your email or phone number to start",
            ),
            placeholder: text(screen, "emailPlaceholder", "you@example.com or +33…"),
            button_text: text(screen, "buttonText", "Continue"),
            footer_text: text(screen, "footerText", "Already have an account?"),
            footer_link_text: text(screen, "footerLinkText", "Log in"),
        }
    }

    pub fn identifier(&self) -> String {
        self.sdk.snapshot().prefilled_username()
    }

    pub fn login_link(&self) -> Option<&str> {
        self.sdk.screen().links.login.as_deref()
    }

    pub fn status(&self) -> FormStatus {
        self.status.lock().clone()
    }

    pub async fn submit(&self, username: &str) -> Result<(), ScreenError> {
        self.status.lock().clear();
        let params = SignupParams {
            username: Some(username.trim().to_string()),
            password: None,
        };
        self.sdk.signup(params).await.map_err(|e| {
            tracing::error!("Signup identifier rejected: {}", e);
            self.status.lock().error = Some(GENERIC_ERROR.to_string());
            ScreenError::Sdk(e)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupPasswordTexts {
    pub title: String,
    pub description: String,
    pub password_placeholder: String,
    pub confirm_placeholder: String,
    pub button_text: String,
    pub footer_text: String,
    pub footer_link_text: String,
}

pub struct SignupPasswordScreen<A> {
    sdk: A,
    status: Mutex<FormStatus>,
}

impl<A: SignupActions> SignupPasswordScreen<A> {
    pub fn new(sdk: A) -> Self {
        Self {
            sdk,
            status: Mutex::new(FormStatus::default()),
        }
    }

    pub fn texts(&self) -> SignupPasswordTexts {
        let screen = self.sdk.screen();
        SignupPasswordTexts {
            title: text(screen, "title", "Set your password"),
            description: text(
                screen,
                "description",
                "Choose a strong password to finish creating your account.",
            ),
            password_placeholder: text(screen, "passwordPlaceholder", "Enter password"),
            confirm_placeholder: text(screen, "confirmPasswordPlaceholder", "Confirm password"),
            button_text: text(screen, "buttonText", "Create account"),
            footer_text: text(screen, "footerText", "Used a wrong email/phone?"),
            footer_link_text: text(screen, "footerLinkText", "Go back"),
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status.lock().clone()
    }

    pub fn edit_link(&self) -> Option<&str> {
        let links = &self.sdk.screen().links;
        links.edit_identifier.as_deref().or(links.back.as_deref())
    }

    /// Messages to show under the form: local error first, then the flow engine's
    pub fn errors(&self) -> Vec<String> {
        let local = self.status.lock().error.clone();
        local
            .into_iter()
            .chain(
                self.sdk
                    .snapshot()
                    .transaction
                    .errors
                    .iter()
                    .map(|e| e.message.clone()),
            )
            .collect()
    }

    /// Submit the new password
    ///
    /// An empty confirmation skips the local match check; the flow engine
    /// still enforces its password policy.
    pub async fn submit(&self, password: &str, confirm: &str) -> Result<(), ScreenError> {
        self.status.lock().clear();
        if !confirm.is_empty() && confirm != password {
            self.status.lock().error = Some(PASSWORD_MISMATCH.to_string());
            return Err(ScreenError::Invalid(PASSWORD_MISMATCH.to_string()));
        }

        let params = SignupParams {
            username: None,
            password: Some(password.to_string()),
        };
        match self.sdk.signup(params).await {
            Ok(()) => {
                self.status.lock().success = true;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Signup password rejected: {}", e);
                self.status.lock().error = Some(GENERIC_ERROR.to_string());
                Err(e.into())
            }
        }
    }
}
