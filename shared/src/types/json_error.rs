use std::fmt;

use serde::{Deserialize, Serialize};

/// Value of `status` in every error body.
pub const ERROR_STATUS: &str = "error";

/// Body of every non-2xx JSON response: `{"status":"error","code":..,"message":..}`.
///
/// `code` is a stable SCREAMING_SNAKE identifier clients can match on;
/// `message` is for humans and may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ERROR_STATUS.to_string(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
