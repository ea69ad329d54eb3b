use hyper::{Request, StatusCode};
use tracing::{error, info, warn};

use shared::types::{AuthorizedResponse, RegistrationData, RegistrationError};

use crate::AppState;
use crate::database::{self, NewUser, StoreError};
use crate::handlers::http::utils::{
    HttpResult, RequestBody, deliver_error_response, deliver_serialized_json, parse_json_body,
};

/// `POST /v1/user/register`
pub async fn handle_register(req: Request<RequestBody>, state: AppState) -> HttpResult {
    info!("Processing registration request");

    let data = match parse_registration(req).await {
        Ok(data) => data,
        Err(e) => {
            warn!("Registration parsing failed: {}", e.to_code());
            return deliver_error(&e);
        }
    };

    if let Err(e) = validate_registration(&data) {
        warn!("Registration validation failed: {}", e.to_code());
        return deliver_error(&e);
    }

    match attempt_registration(&data, &state).await {
        Ok(response) => {
            info!("User registered successfully (ID: {})", response.user.id);
            deliver_serialized_json(&response, StatusCode::CREATED)
        }
        Err(e) => {
            warn!("Registration failed: {}", e.to_code());
            deliver_error(&e)
        }
    }
}

pub fn status_for(error: &RegistrationError) -> StatusCode {
    match error {
        RegistrationError::DuplicateEmail => StatusCode::CONFLICT,
        RegistrationError::InvalidEmail
        | RegistrationError::MissingField(_)
        | RegistrationError::InvalidBody => StatusCode::BAD_REQUEST,
        RegistrationError::Hash
        | RegistrationError::DatabaseError
        | RegistrationError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn deliver_error(error: &RegistrationError) -> HttpResult {
    deliver_error_response(&error.to_response(), status_for(error))
}

async fn parse_registration(
    req: Request<RequestBody>,
) -> std::result::Result<RegistrationData, RegistrationError> {
    let mut data: RegistrationData = parse_json_body(req).await.map_err(|e| {
        warn!("Unreadable registration body: {:#}", e);
        RegistrationError::InvalidBody
    })?;

    data.email = data.email.trim().to_string();
    data.name = data.name.trim().to_string();
    Ok(data)
}

fn validate_registration(data: &RegistrationData) -> std::result::Result<(), RegistrationError> {
    if data.email.is_empty() {
        return Err(RegistrationError::MissingField("email".to_string()));
    }

    if data.password.is_empty() {
        return Err(RegistrationError::MissingField("password".to_string()));
    }

    if !database::is_valid_email(&data.email) {
        return Err(RegistrationError::InvalidEmail);
    }

    Ok(())
}

async fn attempt_registration(
    data: &RegistrationData,
    state: &AppState,
) -> std::result::Result<AuthorizedResponse, RegistrationError> {
    let password_hash = database::hash_password(&data.password).map_err(|e| {
        error!("{}", e);
        RegistrationError::Hash
    })?;

    let row = database::create_user(
        &state.db,
        NewUser {
            email: data.email.clone(),
            password_hash,
            name: data.name.clone(),
        },
    )
    .await
    .map_err(|e| match e {
        StoreError::DuplicateEmail => RegistrationError::DuplicateEmail,
        StoreError::Database(e) => {
            error!("Database error creating user: {}", e);
            RegistrationError::DatabaseError
        }
    })?;

    let token = state
        .tokens
        .issue_with_scopes(row.id, &row.role().scopes())
        .map_err(|e| {
            error!("Failed to issue token for new user {}: {}", row.id, e);
            RegistrationError::InternalError
        })?;

    Ok(AuthorizedResponse {
        message: "User created".to_string(),
        user: row.to_user(),
        token,
    })
}
