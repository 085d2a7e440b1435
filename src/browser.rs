//! Browser bindings: `window.sessionStorage` and DOM navigation

use wasm_bindgen::JsCast;
use web_sys::{HtmlFormElement, HtmlInputElement, Window};

use crate::handoff::{HandoffError, HandoffResult, SessionStorage};
use crate::navigation::{HiddenForm, NavigationError, Navigator};

fn window() -> Option<Window> {
    web_sys::window()
}

/// Tab-scoped storage backed by `window.sessionStorage`
///
/// Fails with [`HandoffError::Storage`] when the storage area is unavailable
/// (no window, privacy mode, quota).
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSessionStorage;

impl BrowserSessionStorage {
    pub fn new() -> Self {
        Self
    }

    fn area(&self) -> HandoffResult<web_sys::Storage> {
        window()
            .ok_or_else(|| HandoffError::Storage("window is unavailable".to_string()))?
            .session_storage()
            .map_err(|_| HandoffError::Storage("failed to access session storage".to_string()))?
            .ok_or_else(|| HandoffError::Storage("session storage is unavailable".to_string()))
    }
}

impl SessionStorage for BrowserSessionStorage {
    fn get(&self, key: &str) -> HandoffResult<Option<String>> {
        self.area()?
            .get_item(key)
            .map_err(|_| HandoffError::Storage(format!("failed to read {}", key)))
    }

    fn set(&self, key: &str, value: &str) -> HandoffResult<()> {
        self.area()?
            .set_item(key, value)
            .map_err(|_| HandoffError::Storage(format!("failed to write {}", key)))
    }

    fn remove(&self, key: &str) -> HandoffResult<()> {
        self.area()?
            .remove_item(key)
            .map_err(|_| HandoffError::Storage(format!("failed to remove {}", key)))
    }
}

/// Navigator over `window.location`, `window.history` and the document body
#[derive(Debug, Default, Clone, Copy)]
pub struct DomNavigator;

impl DomNavigator {
    pub fn new() -> Self {
        Self
    }
}

fn nav_err(msg: &str) -> NavigationError {
    NavigationError(msg.to_string())
}

impl Navigator for DomNavigator {
    fn current_url(&self) -> Option<String> {
        window()?.location().href().ok()
    }

    fn submit_form(&self, form: &HiddenForm) -> Result<(), NavigationError> {
        let window = window().ok_or_else(|| nav_err("window is unavailable"))?;
        let document = window
            .document()
            .ok_or_else(|| nav_err("document is unavailable"))?;
        let body = document
            .body()
            .ok_or_else(|| nav_err("document body is unavailable"))?;

        let element = document
            .create_element("form")
            .map_err(|_| nav_err("failed to create form"))?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| nav_err("form is not HtmlFormElement"))?;
        element.set_method("POST");
        if !form.action.is_empty() {
            element.set_action(&form.action);
        }
        element
            .style()
            .set_property("display", "none")
            .map_err(|_| nav_err("failed to hide form"))?;

        for (name, value) in &form.fields {
            let input = document
                .create_element("input")
                .map_err(|_| nav_err("failed to create input"))?
                .dyn_into::<HtmlInputElement>()
                .map_err(|_| nav_err("input is not HtmlInputElement"))?;
            input.set_type("hidden");
            input.set_name(name);
            input.set_value(value);
            element
                .append_child(&input)
                .map_err(|_| nav_err("failed to append input"))?;
        }

        body.append_child(&element)
            .map_err(|_| nav_err("failed to attach form"))?;
        element.submit().map_err(|_| nav_err("form submission failed"))
    }

    fn assign(&self, href: &str) -> Result<(), NavigationError> {
        window()
            .ok_or_else(|| nav_err("window is unavailable"))?
            .location()
            .assign(href)
            .map_err(|_| NavigationError(format!("failed to navigate to {}", href)))
    }

    fn back(&self) -> Result<(), NavigationError> {
        window()
            .ok_or_else(|| nav_err("window is unavailable"))?
            .history()
            .map_err(|_| nav_err("history is unavailable"))?
            .back()
            .map_err(|_| nav_err("history.back failed"))
    }
}
