//! `login-id` screen: identifier entry, methods lookup and method choice

use parking_lot::Mutex;

use crate::handoff::{Dispatch, HandoffChannel, HandoffProducer, MethodsCache, SessionStorage};
use crate::methods::lookup::BLOCKED_MESSAGE;
use crate::methods::{
    LookupGeneration, Method, MethodsLookup, MethodsSource, ResolvedMethods, resolve_methods,
};
use crate::sdk::LoginIdActions;

use super::{FormStatus, GENERIC_ERROR, ScreenError, ScreenSettings, text};

const EMPTY_IDENTIFIER: &str = "Enter your email address or phone number.";
const OPTIONS_LOADING: &str = "Your sign-in options are still loading.";
const UNKNOWN_METHOD: &str = "Choose one of the sign-in options shown.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginIdTexts {
    pub title: String,
    pub description: String,
    pub email_placeholder: String,
    pub button_text: String,
    pub footer_text: String,
    pub footer_link_text: String,
    pub forgotten_password_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginIdView {
    pub identifier: String,
    /// Method choices, once a lookup has resolved
    pub methods: Option<ResolvedMethods>,
    pub loading: bool,
    pub status: FormStatus,
}

/// Result of an identifier submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Choices are ready to be shown
    Methods(ResolvedMethods),
    /// A newer submission started while this one was in flight; nothing applied
    Superseded,
}

pub struct LoginIdScreen<A, L, S> {
    sdk: A,
    lookup: L,
    channel: HandoffChannel<S>,
    settings: ScreenSettings,
    generation: LookupGeneration,
    view: Mutex<LoginIdView>,
}

impl<A, L, S> LoginIdScreen<A, L, S>
where
    A: LoginIdActions,
    L: MethodsLookup,
    S: SessionStorage,
{
    /// First render: pre-fill the identifier and restore this transaction's cached choices
    pub fn new(sdk: A, lookup: L, channel: HandoffChannel<S>, settings: ScreenSettings) -> Self {
        let mut view = LoginIdView {
            identifier: sdk.snapshot().prefilled_username(),
            ..Default::default()
        };

        if let Some(cache) = channel.methods_cache_for(sdk.transaction_state()) {
            tracing::debug!("Restoring {} cached method(s)", cache.methods.len());
            view.identifier = cache.identifier.clone();
            view.methods = Some(ResolvedMethods {
                identifier: cache.identifier,
                methods: cache.methods,
                password_login_username: cache.password_login_username,
                source: MethodsSource::Endpoint,
                warning: None,
            });
        }

        Self {
            sdk,
            lookup,
            channel,
            settings,
            generation: LookupGeneration::new(),
            view: Mutex::new(view),
        }
    }

    pub fn texts(&self) -> LoginIdTexts {
        let screen = self.sdk.screen();
        LoginIdTexts {
            title: text(screen, "title", "Welcome"),
            description: text(screen, "description", "Login to continue"),
            email_placeholder: text(screen, "emailPlaceholder", "Enter your email"),
            button_text: text(screen, "buttonText", "Continue"),
            footer_text: text(screen, "footerText", "Don't have an account yet?"),
            footer_link_text: text(screen, "footerLinkText", "Create your account"),
            forgotten_password_text: text(
                screen,
                "forgottenPasswordText",
                "Forgot your Password?",
            ),
        }
    }

    pub fn view(&self) -> LoginIdView {
        self.view.lock().clone()
    }

    pub fn signup_link(&self) -> Option<&str> {
        self.sdk.screen().links.signup.as_deref()
    }

    pub fn reset_password_link(&self) -> Option<&str> {
        self.sdk.screen().links.reset_password.as_deref()
    }

    /// Look up the methods available for `identifier`
    ///
    /// A response that arrives after a newer submission started is dropped.
    pub async fn submit_identifier(&self, identifier: &str) -> Result<SubmitOutcome, ScreenError> {
        let identifier = identifier.trim();
        let generation = self.generation.begin();
        {
            let mut view = self.view.lock();
            view.identifier = identifier.to_string();
            view.methods = None;
            view.status.clear();
            if identifier.is_empty() {
                view.loading = false;
                view.status.error = Some(EMPTY_IDENTIFIER.to_string());
                return Err(ScreenError::Invalid(EMPTY_IDENTIFIER.to_string()));
            }
            view.loading = true;
        }

        let state = self.sdk.transaction_state().to_string();
        let cached = self
            .channel
            .methods_cache_for(&state)
            .filter(|cache| cache.identifier == identifier);

        let result = match cached {
            Some(cache) => Ok(ResolvedMethods {
                identifier: cache.identifier,
                methods: cache.methods,
                password_login_username: cache.password_login_username,
                source: MethodsSource::Endpoint,
                warning: None,
            }),
            None => {
                resolve_methods(
                    &self.lookup,
                    identifier,
                    self.settings.lookup_failure_policy,
                    &self.settings.fallback,
                )
                .await
            }
        };

        if !self.generation.is_current(generation) {
            tracing::debug!("Dropping stale methods lookup for generation {}", generation);
            return Ok(SubmitOutcome::Superseded);
        }

        let mut view = self.view.lock();
        view.loading = false;
        match result {
            Ok(resolved) => {
                if resolved.source == MethodsSource::Endpoint && !state.is_empty() {
                    let cache = MethodsCache {
                        state,
                        identifier: resolved.identifier.clone(),
                        methods: resolved.methods.clone(),
                        password_login_username: resolved.password_login_username.clone(),
                    };
                    if let Err(e) = self.channel.write_methods_cache(&cache) {
                        tracing::warn!("Failed to cache methods: {}", e);
                    }
                }
                view.status.notice = resolved.warning.clone();
                view.methods = Some(resolved.clone());
                Ok(SubmitOutcome::Methods(resolved))
            }
            Err(e) => {
                view.methods = None;
                view.status.error = Some(BLOCKED_MESSAGE.to_string());
                Err(ScreenError::Lookup(e))
            }
        }
    }

    /// Continue with the method the user picked
    ///
    /// Only a method from the current, settled list is accepted.
    pub async fn choose_method(&self, method: &Method) -> Result<Dispatch, ScreenError> {
        let password_username = {
            let view = self.view.lock();
            if view.loading {
                return Err(ScreenError::Invalid(OPTIONS_LOADING.to_string()));
            }
            match view.methods.as_ref() {
                Some(resolved) if resolved.methods.contains(method) => {
                    resolved.password_username().to_string()
                }
                _ => return Err(ScreenError::Invalid(UNKNOWN_METHOD.to_string())),
            }
        };

        let result = HandoffProducer::new(&self.channel)
            .dispatch(&self.sdk, method, &password_username)
            .await;

        match result {
            Ok(dispatch) => {
                if matches!(dispatch, Dispatch::Handoff(_)) {
                    // The next transaction step starts from a fresh lookup
                    self.channel.clear_methods_cache();
                }
                Ok(dispatch)
            }
            Err(e) => {
                tracing::error!("Sign-in method {:?} failed: {}", method.connection(), e);
                self.view.lock().status.error = Some(GENERIC_ERROR.to_string());
                Err(ScreenError::Handoff(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::handoff::{Connection, HandoffIntent, MemoryStorage};
    use crate::methods::LookupResponse;
    use crate::methods::lookup::FALLBACK_WARNING;
    use crate::model::config::LookupFailurePolicy;
    use crate::sdk::SdkError;
    use crate::testing::{FakeSdk, ScriptedLookup, SdkCall};

    type Screen = LoginIdScreen<FakeSdk, ScriptedLookup, Arc<MemoryStorage>>;

    fn screen(sdk: FakeSdk, lookup: ScriptedLookup, storage: Arc<MemoryStorage>) -> Screen {
        LoginIdScreen::new(
            sdk,
            lookup,
            HandoffChannel::new(storage),
            ScreenSettings::default(),
        )
    }

    fn alice_methods() -> LookupResponse {
        LookupResponse {
            methods: vec![
                Method::password(),
                Method::passwordless_email("alice@example.com"),
            ],
            identifier: None,
            password_login_username: None,
        }
    }

    #[test]
    fn test_texts_defaults_and_overrides() {
        let sdk = FakeSdk::new("abc").with_text("title", "Bonjour");
        let screen = screen(sdk, ScriptedLookup::failing(), Arc::new(MemoryStorage::new()));

        let texts = screen.texts();
        assert_eq!(texts.title, "Bonjour");
        assert_eq!(texts.description, "Login to continue");
        assert_eq!(texts.button_text, "Continue");
    }

    #[test]
    fn test_prefill_from_screen_data() {
        let sdk = FakeSdk::new("abc").with_username("alice@example.com");
        let screen = screen(sdk, ScriptedLookup::failing(), Arc::new(MemoryStorage::new()));
        assert_eq!(screen.view().identifier, "alice@example.com");
    }

    #[tokio::test]
    async fn test_empty_identifier_is_rejected() {
        let lookup = ScriptedLookup::responding(alice_methods());
        let screen = screen(FakeSdk::new("abc"), lookup, Arc::new(MemoryStorage::new()));

        let result = screen.submit_identifier("   ").await;
        assert!(matches!(result, Err(ScreenError::Invalid(_))));
        assert_eq!(screen.view().status.error.as_deref(), Some(EMPTY_IDENTIFIER));
        assert!(screen.lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_caches_endpoint_methods_for_transaction() {
        let storage = Arc::new(MemoryStorage::new());
        let screen = screen(
            FakeSdk::new("abc"),
            ScriptedLookup::responding(alice_methods()),
            storage.clone(),
        );

        let outcome = screen.submit_identifier("alice@example.com").await.unwrap();
        let SubmitOutcome::Methods(resolved) = outcome else {
            panic!("expected methods");
        };
        assert_eq!(resolved.methods.len(), 2);

        let cache = HandoffChannel::new(storage).methods_cache_for("abc").unwrap();
        assert_eq!(cache.identifier, "alice@example.com");
        assert_eq!(cache.methods, alice_methods().methods);
    }

    #[tokio::test]
    async fn test_cache_keeps_normalized_identifier() {
        let storage = Arc::new(MemoryStorage::new());
        let screen = screen(
            FakeSdk::new("abc"),
            ScriptedLookup::responding(LookupResponse {
                identifier: Some("alice@example.com".to_string()),
                ..alice_methods()
            }),
            storage.clone(),
        );

        screen.submit_identifier("Alice@Example.com").await.unwrap();
        let cache = HandoffChannel::new(storage).methods_cache_for("abc").unwrap();
        assert_eq!(cache.identifier, "alice@example.com");
        assert_eq!(
            screen.view().methods.unwrap().password_username(),
            "alice@example.com"
        );
    }

    #[tokio::test]
    async fn test_second_submit_of_same_identifier_uses_cache() {
        let screen = screen(
            FakeSdk::new("abc"),
            ScriptedLookup::responding(alice_methods()),
            Arc::new(MemoryStorage::new()),
        );

        screen.submit_identifier("alice@example.com").await.unwrap();
        screen.submit_identifier("alice@example.com").await.unwrap();
        assert_eq!(screen.lookup.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_cache_from_other_transaction_is_ignored_on_load() {
        let storage = Arc::new(MemoryStorage::new());
        HandoffChannel::new(storage.clone())
            .write_methods_cache(&MethodsCache {
                state: "A".to_string(),
                identifier: "alice@example.com".to_string(),
                methods: alice_methods().methods,
                password_login_username: None,
            })
            .unwrap();

        let screen = screen(FakeSdk::new("B"), ScriptedLookup::failing(), storage.clone());
        assert!(screen.view().methods.is_none());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_cache_for_current_transaction_is_restored_on_load() {
        let storage = Arc::new(MemoryStorage::new());
        HandoffChannel::new(storage.clone())
            .write_methods_cache(&MethodsCache {
                state: "abc".to_string(),
                identifier: "alice@example.com".to_string(),
                methods: alice_methods().methods,
                password_login_username: None,
            })
            .unwrap();

        let screen = screen(FakeSdk::new("abc"), ScriptedLookup::failing(), storage);
        let view = screen.view();
        assert_eq!(view.identifier, "alice@example.com");
        assert_eq!(view.methods.unwrap().methods, alice_methods().methods);
    }

    #[tokio::test]
    async fn test_lookup_failure_shows_fallback_with_warning() {
        let storage = Arc::new(MemoryStorage::new());
        let screen = screen(FakeSdk::new("abc"), ScriptedLookup::failing(), storage.clone());

        screen.submit_identifier("+33663936646").await.unwrap();
        let view = screen.view();
        assert_eq!(view.status.notice.as_deref(), Some(FALLBACK_WARNING));
        assert!(view.status.error.is_none());
        let methods = view.methods.unwrap();
        assert_eq!(methods.source, MethodsSource::Fallback);
        assert!(
            methods
                .methods
                .contains(&Method::passwordless_phone("+33663936646"))
        );
        // Fallback lists are never cached
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_block_policy_keeps_user_on_form() {
        let mut settings = ScreenSettings::default();
        settings.lookup_failure_policy = LookupFailurePolicy::Block;
        let screen = LoginIdScreen::new(
            FakeSdk::new("abc"),
            ScriptedLookup::failing(),
            HandoffChannel::new(Arc::new(MemoryStorage::new())),
            settings,
        );

        let result = screen.submit_identifier("+33663936646").await;
        assert!(matches!(result, Err(ScreenError::Lookup(_))));
        let view = screen.view();
        assert!(view.methods.is_none());
        assert_eq!(view.status.error.as_deref(), Some(BLOCKED_MESSAGE));
    }

    #[tokio::test]
    async fn test_stale_lookup_response_is_dropped() {
        let lookup = ScriptedLookup::responding(alice_methods())
            .with_delays(&[Duration::from_millis(100), Duration::ZERO]);
        let screen = screen(FakeSdk::new("abc"), lookup, Arc::new(MemoryStorage::new()));

        let (first, second) = tokio::join!(
            screen.submit_identifier("bob@example.com"),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                screen.submit_identifier("alice@example.com").await
            }
        );

        assert_eq!(first.unwrap(), SubmitOutcome::Superseded);
        assert!(matches!(second.unwrap(), SubmitOutcome::Methods(_)));
        let view = screen.view();
        assert_eq!(view.identifier, "alice@example.com");
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_password_choice_uses_server_username() {
        let lookup = ScriptedLookup::responding(LookupResponse {
            methods: vec![Method::password(), Method::passwordless_phone("+33663936646")],
            identifier: None,
            password_login_username: Some("alice@example.com".to_string()),
        });
        let screen = screen(FakeSdk::new("abc"), lookup, Arc::new(MemoryStorage::new()));

        screen.submit_identifier("+33663936646").await.unwrap();
        let dispatch = screen.choose_method(&Method::password()).await.unwrap();

        assert_eq!(
            dispatch,
            Dispatch::Password {
                username: "alice@example.com".to_string()
            }
        );
        assert_eq!(
            screen.sdk.calls(),
            vec![SdkCall::Login {
                username: "alice@example.com".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_passwordless_choice_writes_intent() {
        let storage = Arc::new(MemoryStorage::new());
        let screen = screen(
            FakeSdk::new("abc"),
            ScriptedLookup::responding(alice_methods()),
            storage.clone(),
        );

        screen.submit_identifier("alice@example.com").await.unwrap();
        screen
            .choose_method(&Method::passwordless_email("alice@example.com"))
            .await
            .unwrap();

        let channel = HandoffChannel::new(storage);
        assert_eq!(channel.methods_cache_for("abc"), None);
        assert_eq!(
            channel.take_intent(),
            Some(HandoffIntent::new(Connection::Email, "alice@example.com").unwrap())
        );
    }

    #[tokio::test]
    async fn test_sdk_rejection_shows_generic_error() {
        let screen = screen(
            FakeSdk::new("abc"),
            ScriptedLookup::failing(),
            Arc::new(MemoryStorage::new()),
        );
        screen.submit_identifier("alice@example.com").await.unwrap();
        screen
            .sdk
            .fail_with(SdkError::Rejected("invalid state".to_string()));

        let result = screen.choose_method(&Method::password()).await;
        assert!(matches!(result, Err(ScreenError::Handoff(_))));
        assert_eq!(screen.view().status.error.as_deref(), Some(GENERIC_ERROR));
    }

    #[tokio::test]
    async fn test_choice_while_new_lookup_is_in_flight_is_rejected() {
        let lookup = ScriptedLookup::responding(LookupResponse {
            methods: vec![Method::password(), Method::passwordless_phone("+33663936646")],
            identifier: None,
            password_login_username: Some("alice@example.com".to_string()),
        })
        .with_delays(&[Duration::ZERO, Duration::from_millis(200)]);
        let screen = screen(FakeSdk::new("abc"), lookup, Arc::new(MemoryStorage::new()));
        screen.submit_identifier("+33663936646").await.unwrap();

        let (_, choice) = tokio::join!(screen.submit_identifier("bob@example.com"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let view = screen.view();
            assert!(view.loading);
            assert!(view.methods.is_none());
            screen.choose_method(&Method::password()).await
        });

        assert!(matches!(choice, Err(ScreenError::Invalid(_))));
        assert!(screen.sdk.calls().is_empty());
    }

    #[tokio::test]
    async fn test_choice_outside_current_list_is_rejected() {
        let screen = screen(
            FakeSdk::new("abc"),
            ScriptedLookup::responding(alice_methods()),
            Arc::new(MemoryStorage::new()),
        );

        let before_lookup = screen.choose_method(&Method::password()).await;
        assert!(matches!(before_lookup, Err(ScreenError::Invalid(_))));

        screen.submit_identifier("alice@example.com").await.unwrap();
        let result = screen
            .choose_method(&Method::passwordless_phone("+33663936646"))
            .await;
        assert!(matches!(result, Err(ScreenError::Invalid(_))));
        assert!(screen.sdk.calls().is_empty());
    }
}
