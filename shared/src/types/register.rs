use serde::Deserialize;

use crate::types::json_error::ErrorResponse;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationData {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Error codes for registration
#[derive(Debug)]
pub enum RegistrationError {
    DuplicateEmail,
    InvalidEmail,
    MissingField(String),
    InvalidBody,
    Hash,
    DatabaseError,
    InternalError,
}

impl RegistrationError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::DuplicateEmail => "EMAIL_TAKEN",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidBody => "INVALID_BODY",
            Self::Hash => "HASH_FAILED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::DuplicateEmail => "Email is already registered".to_string(),
            Self::InvalidEmail => "Invalid email format".to_string(),
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::InvalidBody => "Request body must be a JSON object".to_string(),
            Self::Hash => "Cannot generate hash from password".to_string(),
            Self::DatabaseError => "Failed to insert user to database".to_string(),
            Self::InternalError => "An internal error occurred".to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.to_code(), self.to_message())
    }
}
