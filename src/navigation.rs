//! Page navigation seam
//!
//! Screens never build DOM nodes themselves: connection switches go through
//! [`Navigator::submit_form`] and back links through [`Navigator::assign`].

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::Mutex;
use url::Url;

use crate::handoff::intent::HandoffIntent;

/// Full-page navigation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationError(pub String);

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Navigation failed: {}", self.0)
    }
}

impl std::error::Error for NavigationError {}

/// Same-origin form submitted with a full page navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenForm {
    /// Form action; empty posts to the current URL
    pub action: String,
    pub fields: BTreeMap<String, String>,
}

impl HiddenForm {
    /// Form asking the flow engine to switch to the intent's connection
    pub fn connection_switch(action: impl Into<String>, state: &str, intent: &HandoffIntent) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("state".to_string(), state.to_string());
        fields.insert(
            "connection".to_string(),
            intent.connection().as_str().to_string(),
        );
        if !intent.username().is_empty() {
            fields.insert("username".to_string(), intent.username().to_string());
        }
        Self {
            action: action.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Browser navigation capabilities
pub trait Navigator {
    /// Current page URL, when known
    fn current_url(&self) -> Option<String>;
    /// POST `form` with a full page navigation
    fn submit_form(&self, form: &HiddenForm) -> Result<(), NavigationError>;
    fn assign(&self, href: &str) -> Result<(), NavigationError>;
    fn back(&self) -> Result<(), NavigationError>;
}

/// Navigation performed by a [`RecordingNavigator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRecord {
    Submit(HiddenForm),
    Assign(String),
    Back,
}

/// Navigator that records calls instead of leaving the page
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    current_url: Option<String>,
    records: Mutex<Vec<NavigationRecord>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(url: impl Into<String>) -> Self {
        Self {
            current_url: Some(url.into()),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<NavigationRecord> {
        self.records.lock().clone()
    }

    pub fn submitted_forms(&self) -> Vec<HiddenForm> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| match r {
                NavigationRecord::Submit(form) => Some(form.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn current_url(&self) -> Option<String> {
        self.current_url.clone()
    }

    fn submit_form(&self, form: &HiddenForm) -> Result<(), NavigationError> {
        self.records.lock().push(NavigationRecord::Submit(form.clone()));
        Ok(())
    }

    fn assign(&self, href: &str) -> Result<(), NavigationError> {
        self.records
            .lock()
            .push(NavigationRecord::Assign(href.to_string()));
        Ok(())
    }

    fn back(&self) -> Result<(), NavigationError> {
        self.records.lock().push(NavigationRecord::Back);
        Ok(())
    }
}

impl<T: Navigator + ?Sized> Navigator for std::sync::Arc<T> {
    fn current_url(&self) -> Option<String> {
        (**self).current_url()
    }

    fn submit_form(&self, form: &HiddenForm) -> Result<(), NavigationError> {
        (**self).submit_form(form)
    }

    fn assign(&self, href: &str) -> Result<(), NavigationError> {
        (**self).assign(href)
    }

    fn back(&self) -> Result<(), NavigationError> {
        (**self).back()
    }
}

/// Identifier-screen URL for the transaction in `current_url`
///
/// Returns `None` when the URL can't be parsed or carries no `state`.
pub fn identifier_url(current_url: &str, identifier_path: &str) -> Option<String> {
    let current = Url::parse(current_url).ok()?;
    let state = current
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .filter(|state| !state.is_empty())?;

    let mut target = current.join(identifier_path).ok()?;
    target.set_fragment(None);
    target.query_pairs_mut().clear().append_pair("state", &state);
    Some(target.to_string())
}

/// "Back to sign-in options": identifier screen, else `fallback_href`, else history
pub fn back_to_identifier<N: Navigator>(
    navigator: &N,
    identifier_path: &str,
    fallback_href: Option<&str>,
) -> Result<(), NavigationError> {
    if let Some(target) = navigator
        .current_url()
        .and_then(|url| identifier_url(&url, identifier_path))
    {
        tracing::debug!("Returning to identifier screen: {}", target);
        return navigator.assign(&target);
    }

    tracing::debug!("No transaction state in current URL, using fallback link");
    match fallback_href.filter(|href| !href.is_empty()) {
        Some(href) => navigator.assign(href),
        None => navigator.back(),
    }
}
