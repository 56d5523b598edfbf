//! Error types for the macro nutrition skill
//!
//! `InvalidIntent` is the only failure the request router itself produces.
//! The remaining variants come from the hosting edge: event decoding,
//! application id gating and configuration.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of an error message surfaced to the host
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Main error type for skill invocations
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Invalid intent: {name}")]
    InvalidIntent { name: String },

    #[error("Malformed event: {message}")]
    MalformedEvent { message: String },

    #[error("Invalid application id: {received}")]
    InvalidApplicationId { received: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("Response serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error codes reported to the host in error bodies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidIntent,
    MalformedEvent,
    InvalidApplicationId,
    InternalError,
}

/// Error body returned by the HTTP host when an invocation fails
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub error: String,
    pub timestamp: i64,
}

impl SkillError {
    /// Create invalid intent error
    pub fn invalid_intent<S: Into<String>>(name: S) -> Self {
        Self::InvalidIntent { name: name.into() }
    }

    /// Create malformed event error
    pub fn malformed_event<S: Into<String>>(message: S) -> Self {
        Self::MalformedEvent {
            message: message.into(),
        }
    }

    /// Create invalid application id error
    pub fn invalid_application_id<S: Into<String>>(received: S) -> Self {
        Self::InvalidApplicationId {
            received: received.into(),
        }
    }

    /// Protocol error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            SkillError::InvalidIntent { .. } => ErrorCode::InvalidIntent,
            SkillError::MalformedEvent { .. } => ErrorCode::MalformedEvent,
            SkillError::InvalidApplicationId { .. } => ErrorCode::InvalidApplicationId,
            SkillError::ConfigError(_) | SkillError::Serialization(_) => ErrorCode::InternalError,
        }
    }

    /// HTTP status the host should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            SkillError::InvalidIntent { .. } | SkillError::MalformedEvent { .. } => 400,
            SkillError::InvalidApplicationId { .. } => 403,
            SkillError::ConfigError(_) | SkillError::Serialization(_) => 500,
        }
    }

    /// Convert into the error body surfaced to the host
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            error: sanitize_error_message(&self.to_string()),
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// Cap error messages so a hostile event cannot echo arbitrarily large input
fn sanitize_error_message(message: &str) -> String {
    let sanitized: String = message.chars().filter(|c| !c.is_control()).collect();

    if sanitized.len() <= MAX_ERROR_MESSAGE_LEN {
        return sanitized;
    }

    let truncate_suffix = "...[truncated]";
    let mut cut = MAX_ERROR_MESSAGE_LEN - truncate_suffix.len();
    while !sanitized.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &sanitized[..cut], truncate_suffix)
}

/// Result type for skill operations
pub type SkillResult<T> = Result<T, SkillError>;
