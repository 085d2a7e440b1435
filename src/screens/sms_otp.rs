//! `login-passwordless-sms-otp` screen

use parking_lot::Mutex;

use crate::handoff::{ConsumeOutcome, Connection, HandoffChannel, SessionStorage};
use crate::navigation::{Navigator, back_to_identifier};
use crate::sdk::SmsOtpActions;

use super::{FormStatus, ScreenError, ScreenSettings, consume_handoff, text};

pub const OTP_MAX_LEN: usize = 8;

pub const MISSING_FIELDS: &str = "Phone and OTP are required.";
pub const INVALID_OTP: &str = "Invalid OTP. Please try again.";
pub const RESEND_FAILED: &str = "Failed to resend OTP. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsOtpTexts {
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub resend_text: String,
    pub back_text: String,
}

pub struct SmsOtpScreen<A, N> {
    sdk: A,
    navigator: N,
    identifier_path: String,
    handoff: ConsumeOutcome,
    phone: String,
    status: Mutex<FormStatus>,
}

impl<A, N> SmsOtpScreen<A, N>
where
    A: SmsOtpActions,
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
            Connection::Sms,
            sdk.transaction_state(),
        );
        // The hand-off value is submitted exactly as the lookup returned it
        let phone = match &handoff {
            ConsumeOutcome::Prefill { username } => username.clone(),
            _ => sdk.snapshot().prefilled_username(),
        };

        Self {
            sdk,
            navigator,
            identifier_path: settings.identifier_path.clone(),
            handoff,
            phone,
            status: Mutex::new(FormStatus::default()),
        }
    }

    pub fn is_redirecting(&self) -> bool {
        self.handoff.is_redirecting()
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn status(&self) -> FormStatus {
        self.status.lock().clone()
    }

    pub fn texts(&self) -> SmsOtpTexts {
        let screen = self.sdk.screen();
        SmsOtpTexts {
            title: text(screen, "title", "Continue with SMS OTP"),
            description: text(screen, "description", "Enter the code we sent to your phone."),
            button_text: text(screen, "buttonText", "Continue"),
            resend_text: text(screen, "resendActionText", "Resend Code"),
            back_text: text(screen, "backText", "Back to sign-in options"),
        }
    }

    pub async fn submit_otp(&self, otp: &str) -> Result<(), ScreenError> {
        if self.is_redirecting() {
            return Err(ScreenError::Redirecting);
        }
        self.status.lock().clear();

        let otp = otp.trim();
        if self.phone.is_empty() || otp.is_empty() {
            self.status.lock().error = Some(MISSING_FIELDS.to_string());
            return Err(ScreenError::Invalid(MISSING_FIELDS.to_string()));
        }
        if otp.chars().count() > OTP_MAX_LEN {
            self.status.lock().error = Some(INVALID_OTP.to_string());
            return Err(ScreenError::Invalid(INVALID_OTP.to_string()));
        }

        match self.sdk.submit_otp(&self.phone, otp).await {
            Ok(()) => {
                self.status.lock().success = true;
                Ok(())
            }
            Err(e) => {
                tracing::error!("SMS OTP submission failed: {}", e);
                self.status.lock().error = Some(INVALID_OTP.to_string());
                Err(e.into())
            }
        }
    }

    pub async fn resend_otp(&self) -> Result<(), ScreenError> {
        self.status.lock().clear();
        self.sdk.resend_otp().await.map_err(|e| {
            tracing::error!("SMS OTP resend failed: {}", e);
            self.status.lock().error = Some(RESEND_FAILED.to_string());
            ScreenError::Sdk(e)
        })
    }

    pub fn back_to_options(&self) -> Result<(), ScreenError> {
        let fallback = self.sdk.screen().links.back.as_deref();
        back_to_identifier(&self.navigator, &self.identifier_path, fallback)
            .map_err(ScreenError::Navigation)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::handoff::{HandoffIntent, MemoryStorage};
    use crate::navigation::{NavigationRecord, RecordingNavigator};
    use crate::sdk::{ScreenSnapshot, SdkError};
    use crate::testing::{FakeSdk, SdkCall};

    fn open(
        sdk: FakeSdk,
        navigator: RecordingNavigator,
        channel: &HandoffChannel<Arc<MemoryStorage>>,
    ) -> SmsOtpScreen<FakeSdk, RecordingNavigator> {
        SmsOtpScreen::new(sdk, navigator, channel, &ScreenSettings::default())
    }

    fn channel_with_phone(phone: &str) -> HandoffChannel<Arc<MemoryStorage>> {
        let channel = HandoffChannel::new(Arc::new(MemoryStorage::new()));
        channel
            .write_intent(&HandoffIntent::new(Connection::Sms, phone).unwrap())
            .unwrap();
        channel
    }

    #[tokio::test]
    async fn test_handoff_phone_is_submitted_verbatim() {
        let channel = channel_with_phone("+33 6 63 93 66 46");
        let screen = open(FakeSdk::new("abc"), RecordingNavigator::new(), &channel);

        assert_eq!(screen.phone(), "+33 6 63 93 66 46");
        screen.submit_otp("4242").await.unwrap();
        assert_eq!(
            screen.sdk.calls(),
            vec![SdkCall::SubmitOtp {
                username: "+33 6 63 93 66 46".to_string(),
                code: "4242".to_string()
            }]
        );
        assert!(screen.status().success);
    }

    #[tokio::test]
    async fn test_missing_phone_is_rejected() {
        let channel = HandoffChannel::new(Arc::new(MemoryStorage::new()));
        let screen = open(FakeSdk::new("abc"), RecordingNavigator::new(), &channel);

        assert!(screen.submit_otp("4242").await.is_err());
        assert_eq!(screen.status().error.as_deref(), Some(MISSING_FIELDS));
    }

    #[tokio::test]
    async fn test_overlong_otp_is_rejected() {
        let channel = channel_with_phone("+33663936646");
        let screen = open(FakeSdk::new("abc"), RecordingNavigator::new(), &channel);

        assert!(screen.submit_otp("123456789").await.is_err());
        assert_eq!(screen.status().error.as_deref(), Some(INVALID_OTP));
        assert!(screen.sdk.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_otp_and_resend_messages() {
        let channel = channel_with_phone("+33663936646");
        let screen = open(FakeSdk::new("abc"), RecordingNavigator::new(), &channel);
        screen
            .sdk
            .fail_with(SdkError::Rejected("invalid-code".to_string()));

        assert!(screen.submit_otp("0000").await.is_err());
        assert_eq!(screen.status().error.as_deref(), Some(INVALID_OTP));

        assert!(screen.resend_otp().await.is_err());
        assert_eq!(screen.status().error.as_deref(), Some(RESEND_FAILED));

        screen.sdk.succeed();
        screen.resend_otp().await.unwrap();
        assert_eq!(screen.status(), FormStatus::default());
        assert_eq!(screen.sdk.calls().last(), Some(&SdkCall::ResendOtp));
    }

    #[test]
    fn test_back_without_state_uses_back_link() {
        let mut snapshot = ScreenSnapshot::default();
        snapshot.screen.links.back = Some("/u/login/identifier".to_string());
        let channel = HandoffChannel::new(Arc::new(MemoryStorage::new()));
        let screen = open(
            FakeSdk::with_snapshot(snapshot),
            RecordingNavigator::at("https://login.example.com/u/login/passwordless-sms"),
            &channel,
        );

        screen.back_to_options().unwrap();
        assert_eq!(
            screen.navigator.records(),
            vec![NavigationRecord::Assign("/u/login/identifier".to_string())]
        );
    }

    #[test]
    fn test_back_without_state_or_link_uses_history() {
        let channel = HandoffChannel::new(Arc::new(MemoryStorage::new()));
        let screen = open(FakeSdk::new("abc"), RecordingNavigator::new(), &channel);

        screen.back_to_options().unwrap();
        assert_eq!(screen.navigator.records(), vec![NavigationRecord::Back]);
    }
}
