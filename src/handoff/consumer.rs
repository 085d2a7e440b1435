//! Hand-off consumer: acts on a pending intent when a screen first renders

use crate::navigation::{HiddenForm, Navigator};

use super::intent::{Connection, HandoffIntent};
use super::storage::{HandoffChannel, SessionStorage};

/// What the screen should do after checking the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Nothing pending, render the normal form
    NoHandoff,
    /// Connection-switch form submitted; keep the screen's own UI hidden
    Redirecting { connection: Connection },
    /// Pending intent is for this screen; pre-fill the identifier
    Prefill { username: String },
}

impl ConsumeOutcome {
    pub fn is_redirecting(&self) -> bool {
        matches!(self, Self::Redirecting { .. })
    }
}

/// Consumer side of the hand-off channel
pub struct HandoffConsumer<'a, S, N> {
    channel: &'a HandoffChannel<S>,
    navigator: &'a N,
    native: Connection,
    switch_action: Option<&'a str>,
}

impl<'a, S: SessionStorage, N: Navigator> HandoffConsumer<'a, S, N> {
    pub fn new(channel: &'a HandoffChannel<S>, navigator: &'a N, native: Connection) -> Self {
        Self {
            channel,
            navigator,
            native,
            switch_action: None,
        }
    }

    /// Post connection switches to `action` instead of the current URL
    pub fn with_switch_action(mut self, action: Option<&'a str>) -> Self {
        self.switch_action = action;
        self
    }

    /// Take the pending intent and act on it
    ///
    /// The record is gone once this returns, so a reload renders the normal
    /// form instead of redirecting again.
    pub fn on_first_render(&self, transaction_state: &str) -> ConsumeOutcome {
        let Some(intent) = self.channel.take_intent() else {
            return ConsumeOutcome::NoHandoff;
        };

        if intent.connection() == &self.native {
            tracing::debug!("Hand-off matches {} screen, pre-filling", self.native);
            return ConsumeOutcome::Prefill {
                username: intent.username().to_string(),
            };
        }

        self.switch_connection(transaction_state, &intent)
    }

    fn switch_connection(&self, transaction_state: &str, intent: &HandoffIntent) -> ConsumeOutcome {
        if transaction_state.is_empty() {
            tracing::warn!("No transaction state, cannot switch to {}", intent.connection());
            return ConsumeOutcome::NoHandoff;
        }

        let action = self
            .switch_action
            .map(str::to_string)
            .or_else(|| self.navigator.current_url())
            .unwrap_or_default();
        let form = HiddenForm::connection_switch(action, transaction_state, intent);

        match self.navigator.submit_form(&form) {
            Ok(()) => {
                tracing::info!(
                    "Switching connection {} -> {}",
                    self.native,
                    intent.connection()
                );
                ConsumeOutcome::Redirecting {
                    connection: intent.connection().clone(),
                }
            }
            Err(e) => {
                tracing::warn!("Connection switch failed, showing {} form: {}", self.native, e);
                ConsumeOutcome::NoHandoff
            }
        }
    }
}
