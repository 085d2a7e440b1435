//! Methods-lookup wire types

use serde::{Deserialize, Serialize};

use crate::handoff::intent::Connection;

/// A sign-in method offered for an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Method {
    Password {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    PasswordlessEmail {
        /// Address the code is sent to
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    PasswordlessPhone {
        /// Number the code is sent to
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Enterprise {
        connection: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        login_hint: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl Method {
    pub fn password() -> Self {
        Self::Password { label: None }
    }

    pub fn passwordless_email(value: impl Into<String>) -> Self {
        Self::PasswordlessEmail {
            value: value.into(),
            label: None,
        }
    }

    pub fn passwordless_phone(value: impl Into<String>) -> Self {
        Self::PasswordlessPhone {
            value: value.into(),
            label: None,
        }
    }

    pub fn enterprise(connection: impl Into<String>) -> Self {
        Self::Enterprise {
            connection: connection.into(),
            login_hint: None,
            label: None,
        }
    }

    /// Connection this method signs in with
    pub fn connection(&self) -> Connection {
        match self {
            Self::Password { .. } => Connection::Password,
            Self::PasswordlessEmail { .. } => Connection::Email,
            Self::PasswordlessPhone { .. } => Connection::Sms,
            Self::Enterprise { connection, .. } => Connection::from(connection.as_str()),
        }
    }

    /// Button text for the method choice
    pub fn label(&self) -> String {
        match self {
            Self::Password { label } => label
                .clone()
                .unwrap_or_else(|| "Continue with password".to_string()),
            Self::PasswordlessEmail { value, label } => label
                .clone()
                .unwrap_or_else(|| format!("Email a code to {}", value)),
            Self::PasswordlessPhone { value, label } => label
                .clone()
                .unwrap_or_else(|| format!("Text a code to {}", value)),
            Self::Enterprise {
                connection, label, ..
            } => label
                .clone()
                .unwrap_or_else(|| format!("Continue with {}", connection)),
        }
    }
}

/// Methods-lookup request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub identifier: String,
}

/// Methods-lookup response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    #[serde(default)]
    pub methods: Vec<Method>,

    /// Normalized identifier, when the endpoint rewrote the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Username the password connection knows this user by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_login_username: Option<String>,
}
