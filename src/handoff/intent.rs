//! Hand-off intent: the connection the user picked and the identifier to use with it

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{HandoffError, HandoffResult};

/// Minimum and maximum digit count of a phone number (E.164 caps at 15)
const PHONE_MIN_DIGITS: usize = 6;
const PHONE_MAX_DIGITS: usize = 15;

/// Authentication connection recognized by the hosted flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Connection {
    Password,
    /// Passwordless email code
    Email,
    /// Passwordless SMS code
    Sms,
    /// Enterprise connection, by name
    Enterprise(String),
}

impl Connection {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Password => "password",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Enterprise(name) => name,
        }
    }

    /// Check that `username` has the shape this connection needs
    pub fn accepts(&self, username: &str) -> bool {
        match self {
            Self::Email => is_email_shaped(username),
            Self::Sms => is_phone_shaped(username),
            Self::Password | Self::Enterprise(_) => !username.trim().is_empty(),
        }
    }
}

impl From<String> for Connection {
    fn from(value: String) -> Self {
        match value.as_str() {
            "password" | "Username-Password-Authentication" => Self::Password,
            "email" => Self::Email,
            "sms" => Self::Sms,
            _ => Self::Enterprise(value),
        }
    }
}

impl From<&str> for Connection {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Connection> for String {
    fn from(value: Connection) -> Self {
        match value {
            Connection::Enterprise(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pending hand-off written by the identifier screen for the next screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffIntent {
    connection: Connection,
    username: String,
}

impl HandoffIntent {
    /// Create an intent, rejecting usernames that don't fit the connection
    pub fn new(connection: Connection, username: impl Into<String>) -> HandoffResult<Self> {
        let username = username.into().trim().to_string();
        if username.is_empty() {
            return Err(HandoffError::EmptyUsername);
        }
        if !connection.accepts(&username) {
            return Err(HandoffError::InvalidUsername {
                connection,
                username,
            });
        }
        Ok(Self {
            connection,
            username,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Re-check the invariant on a record read back from storage
    pub(crate) fn validate(self) -> HandoffResult<Self> {
        Self::new(self.connection, self.username)
    }
}

/// `local@domain` with both parts non-empty and no whitespace
pub fn is_email_shaped(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Optional leading `+`, then digits with common separators (space, dash, dot, parentheses)
pub fn is_phone_shaped(value: &str) -> bool {
    let value = value.trim();
    let body = value.strip_prefix('+').unwrap_or(value);
    if body.is_empty() {
        return false;
    }

    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return false,
        }
    }
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_mapping() {
        assert_eq!(Connection::from("password"), Connection::Password);
        assert_eq!(Connection::from("email"), Connection::Email);
        assert_eq!(Connection::from("sms"), Connection::Sms);
        assert_eq!(
            Connection::from("acme-okta"),
            Connection::Enterprise("acme-okta".to_string())
        );
        assert_eq!(String::from(Connection::Sms), "sms");
        assert_eq!(Connection::Enterprise("acme-okta".into()).as_str(), "acme-okta");
    }

    #[test]
    fn test_database_connection_name_is_password() {
        assert_eq!(
            Connection::from("Username-Password-Authentication"),
            Connection::Password
        );
    }

    #[test]
    fn test_email_intent_requires_at_sign() {
        let intent = HandoffIntent::new(Connection::Email, "alice@example.com").unwrap();
        assert!(intent.username().contains('@'));

        let err = HandoffIntent::new(Connection::Email, "+33663936646").unwrap_err();
        assert!(matches!(err, HandoffError::InvalidUsername { .. }));
    }

    #[test]
    fn test_sms_intent_requires_phone_shape() {
        let intent = HandoffIntent::new(Connection::Sms, "+33663936646").unwrap();
        assert!(is_phone_shaped(intent.username()));

        assert!(HandoffIntent::new(Connection::Sms, "alice@example.com").is_err());
    }

    #[test]
    fn test_intent_trims_and_rejects_empty() {
        let intent = HandoffIntent::new(Connection::Sms, "  +33 6 63 93 66 46 ").unwrap();
        assert_eq!(intent.username(), "+33 6 63 93 66 46");

        assert!(matches!(
            HandoffIntent::new(Connection::Password, "   "),
            Err(HandoffError::EmptyUsername)
        ));
    }

    #[test]
    fn test_intent_json_shape() {
        let intent = HandoffIntent::new(Connection::Email, "alice@example.com").unwrap();
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"connection": "email", "username": "alice@example.com"})
        );
    }

    #[test]
    fn test_validate_rejects_tampered_record() {
        let raw = r#"{"connection": "email", "username": "not-an-email"}"#;
        let intent: HandoffIntent = serde_json::from_str(raw).unwrap();
        assert!(intent.validate().is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email_shaped("alice@example.com"));
        assert!(!is_email_shaped("alice@"));
        assert!(!is_email_shaped("@example.com"));
        assert!(!is_email_shaped("a@b@c"));
        assert!(!is_email_shaped("alice @example.com"));
    }

    #[test]
    fn test_phone_shape() {
        assert!(is_phone_shaped("+33663936646"));
        assert!(is_phone_shaped("(555) 010-2030"));
        assert!(!is_phone_shaped("+"));
        assert!(!is_phone_shaped("12345"));
        assert!(!is_phone_shaped("1234567890123456"));
        assert!(!is_phone_shaped("+33abc"));
    }
}
