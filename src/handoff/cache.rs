//! Methods cache, memoizing a lookup for the current hosted-flow transaction

use serde::{Deserialize, Serialize};

use crate::methods::types::Method;

/// Lookup result remembered for one transaction
///
/// The `state` is a validity key, not a secret: a different state means the
/// user started a new transaction and the cached methods no longer apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodsCache {
    pub state: String,
    /// Identifier as typed by the user
    pub identifier: String,
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_login_username: Option<String>,
}

impl MethodsCache {
    pub fn is_valid_for(&self, state: &str) -> bool {
        !state.is_empty() && self.state == state
    }

    /// Username to resume the password connection with
    pub fn password_username(&self) -> &str {
        self.password_login_username
            .as_deref()
            .unwrap_or(&self.identifier)
    }
}
