//! Hand-off producer: turns the method the user picked into the next navigation

use std::fmt;

use crate::methods::types::Method;
use crate::sdk::{LoginIdActions, SdkError};

use super::error::HandoffError;
use super::intent::HandoffIntent;
use super::storage::{HandoffChannel, SessionStorage};

/// Navigation started for a chosen method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Password flow resumed directly through `login`
    Password { username: String },
    /// Intent stored, then `login` with the passwordless identifier
    Handoff(HandoffIntent),
    /// Redirect to a third-party identity provider
    Federated { connection: String },
}

/// Hand-off producer error types
#[derive(Debug)]
pub enum ProduceError {
    /// The method's value can't be used with its connection
    InvalidMethod(HandoffError),
    /// The intent could not be stored
    Storage(HandoffError),
    Sdk(SdkError),
}

impl fmt::Display for ProduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMethod(e) => write!(f, "Invalid sign-in method: {}", e),
            Self::Storage(e) => write!(f, "Failed to store hand-off: {}", e),
            Self::Sdk(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProduceError {}

/// Producer side of the hand-off channel, used by the identifier screen
pub struct HandoffProducer<'a, S> {
    channel: &'a HandoffChannel<S>,
}

impl<'a, S: SessionStorage> HandoffProducer<'a, S> {
    pub fn new(channel: &'a HandoffChannel<S>) -> Self {
        Self { channel }
    }

    fn discard_stale_intent(&self) {
        if let Err(e) = self.channel.discard_intent() {
            tracing::warn!("Failed to discard hand-off intent: {}", e);
        }
    }

    /// Act on the user's choice
    ///
    /// Only passwordless methods write to the channel. Other choices clear any
    /// leftover intent so the next screen can't act on a stale one, and a
    /// failed `login` removes the intent it just wrote.
    pub async fn dispatch<A: LoginIdActions>(
        &self,
        sdk: &A,
        method: &Method,
        password_username: &str,
    ) -> Result<Dispatch, ProduceError> {
        match method {
            Method::Password { .. } => {
                self.discard_stale_intent();
                sdk.login(password_username)
                    .await
                    .map_err(ProduceError::Sdk)?;
                Ok(Dispatch::Password {
                    username: password_username.to_string(),
                })
            }
            Method::PasswordlessEmail { value, .. } | Method::PasswordlessPhone { value, .. } => {
                let intent = HandoffIntent::new(method.connection(), value.as_str())
                    .map_err(ProduceError::InvalidMethod)?;
                self.channel
                    .write_intent(&intent)
                    .map_err(ProduceError::Storage)?;

                if let Err(e) = sdk.login(intent.username()).await {
                    self.discard_stale_intent();
                    return Err(ProduceError::Sdk(e));
                }
                tracing::info!("Hand-off started: connection={}", intent.connection());
                Ok(Dispatch::Handoff(intent))
            }
            Method::Enterprise {
                connection,
                login_hint,
                ..
            } => {
                self.discard_stale_intent();
                sdk.federated_login(connection, login_hint.as_deref())
                    .await
                    .map_err(ProduceError::Sdk)?;
                Ok(Dispatch::Federated {
                    connection: connection.clone(),
                })
            }
        }
    }
}
