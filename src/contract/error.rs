use thiserror::Error;

/// Rejection of a single payload at the contract boundary. Never fatal to
/// the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("invalid message type: {0}")]
    InvalidType(String),
    #[error("chat message content is missing or not text")]
    MissingContent,
    #[error("upload response message is missing or not text")]
    MissingMessage,
    #[error("invalid casesIndexed: {0}")]
    InvalidCount(String),
    #[error("a {role} message may not be typed '{message_type}'")]
    RoleTypeMismatch {
        role: String,
        message_type: String,
    },
    #[error("malformed JSON payload: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}
