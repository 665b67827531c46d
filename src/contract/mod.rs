//! Boundary validation for the two wire shapes: chat turns and upload
//! acknowledgments. Every function here is pure.

pub mod error;

pub use error::ValidationError;

use crate::models::{ ChatMessage, MessageType, Role, UploadResponse };
use serde::{ Deserialize, Serialize };
use serde_json::Value;
use std::str::FromStr;

/// Whether a `user` turn may carry a bot-only classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    #[default]
    Lenient,
    /// Rejects `user` turns typed `apology` or `rule-answer`.
    Strict,
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(ValidationPolicy::Lenient),
            "strict" => Ok(ValidationPolicy::Strict),
            _ => Err(format!("Unsupported validation policy: {}", s)),
        }
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "missing".to_string(),
        Some(Value::String(s)) => format!("'{}'", s),
        Some(other) => other.to_string(),
    }
}

/// Validates with the lenient policy.
pub fn validate_chat_message(input: &Value) -> Result<ChatMessage, ValidationError> {
    validate_chat_message_with(input, ValidationPolicy::Lenient)
}

pub fn validate_chat_message_with(
    input: &Value,
    policy: ValidationPolicy
) -> Result<ChatMessage, ValidationError> {
    let role_value = input.get("role");
    let role = role_value
        .and_then(Value::as_str)
        .and_then(Role::from_wire)
        .ok_or_else(|| ValidationError::InvalidRole(describe(role_value)))?;

    let content = input
        .get("content")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingContent)?;

    let message_type = match input.get("type") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let parsed = raw
                .as_str()
                .and_then(MessageType::from_wire)
                .ok_or_else(|| ValidationError::InvalidType(describe(Some(raw))))?;
            Some(parsed)
        }
    };

    if policy == ValidationPolicy::Strict && role == Role::User {
        if let Some(kind @ (MessageType::Apology | MessageType::RuleAnswer)) = message_type {
            return Err(ValidationError::RoleTypeMismatch {
                role: role.to_string(),
                message_type: kind.to_string(),
            });
        }
    }

    Ok(ChatMessage::new(role, content, message_type))
}

pub fn validate_upload_response(input: &Value) -> Result<UploadResponse, ValidationError> {
    let count_value = input.get("casesIndexed");
    let cases_indexed = count_value
        .and_then(non_negative_integer)
        .ok_or_else(|| ValidationError::InvalidCount(describe(count_value)))?;

    let message = input
        .get("message")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingMessage)?;

    Ok(UploadResponse::new(message, cases_indexed))
}

const TWO_POW_64: f64 = 18446744073709551616.0;

/// Accepts unsigned integers and integral, non-negative floats such as `3.0`.
fn non_negative_integer(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(n) => n,
        _ => return None,
    };
    if let Some(n) = number.as_u64() {
        return Some(n);
    }
    if number.is_i64() {
        return None;
    }
    let f = number.as_f64()?;
    // `u64::MAX as f64` rounds up to 2^64, so compare against 2^64 exactly.
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < TWO_POW_64 {
        Some(f as u64)
    } else {
        None
    }
}

pub fn parse_chat_message(
    raw: &str,
    policy: ValidationPolicy
) -> Result<ChatMessage, ValidationError> {
    let value: Value = serde_json::from_str(raw)?;
    validate_chat_message_with(&value, policy)
}

pub fn parse_upload_response(raw: &str) -> Result<UploadResponse, ValidationError> {
    let value: Value = serde_json::from_str(raw)?;
    validate_upload_response(&value)
}
