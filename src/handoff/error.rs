//! Hand-off channel error definitions

use std::fmt;

use super::intent::Connection;

/// Hand-off channel error types
#[derive(Debug)]
pub enum HandoffError {
    /// The username does not have the shape the connection requires
    InvalidUsername {
        connection: Connection,
        username: String,
    },
    /// The username is empty
    EmptyUsername,
    /// The storage area refused the operation (quota, privacy mode, no window)
    Storage(String),
    /// A record could not be serialized or deserialized
    Encoding(serde_json::Error),
}

impl std::error::Error for HandoffError {}

impl fmt::Display for HandoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUsername {
                connection,
                username,
            } => {
                write!(
                    f,
                    "Username {:?} is not valid for the {} connection",
                    username, connection
                )
            }
            Self::EmptyUsername => write!(f, "Username is empty"),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
            Self::Encoding(e) => write!(f, "Record encoding failed: {}", e),
        }
    }
}

impl From<serde_json::Error> for HandoffError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encoding(e)
    }
}

/// Hand-off result type
pub type HandoffResult<T> = Result<T, HandoffError>;
