use hyper::{Request, StatusCode};
use tracing::{error, info, warn};

use shared::types::{AuthorizedResponse, LoginData, LoginError};

use crate::AppState;
use crate::database;
use crate::handlers::http::utils::{
    HttpResult, RequestBody, deliver_error_response, deliver_serialized_json, parse_json_body,
};

/// `POST /v1/user/login`
pub async fn handle_login(req: Request<RequestBody>, state: AppState) -> HttpResult {
    info!("Processing login request");

    let login_data = match parse_login(req).await {
        Ok(data) => data,
        Err(login_error) => {
            warn!("Login parsing failed: {}", login_error.to_code());
            return deliver_error(&login_error);
        }
    };

    if let Err(login_error) = validate_login(&login_data) {
        warn!("Login validation failed: {}", login_error.to_code());
        return deliver_error(&login_error);
    }

    match attempt_login(&login_data, &state).await {
        Ok(response) => {
            info!("User logged in successfully (ID: {})", response.user.id);
            deliver_serialized_json(&response, StatusCode::OK)
        }
        Err(login_error) => {
            warn!("Login failed: {}", login_error.to_code());
            deliver_error(&login_error)
        }
    }
}

pub fn status_for(error: &LoginError) -> StatusCode {
    match error {
        LoginError::UserNotFound | LoginError::CredentialMismatch => StatusCode::UNAUTHORIZED,
        LoginError::MissingField(_) | LoginError::InvalidBody => StatusCode::BAD_REQUEST,
        LoginError::DatabaseError | LoginError::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn deliver_error(error: &LoginError) -> HttpResult {
    deliver_error_response(&error.to_response(), status_for(error))
}

async fn parse_login(req: Request<RequestBody>) -> std::result::Result<LoginData, LoginError> {
    let mut data: LoginData = parse_json_body(req).await.map_err(|e| {
        warn!("Unreadable login body: {:#}", e);
        LoginError::InvalidBody
    })?;

    data.email = data.email.trim().to_string();
    Ok(data)
}

fn validate_login(data: &LoginData) -> std::result::Result<(), LoginError> {
    if data.email.is_empty() {
        return Err(LoginError::MissingField("email".to_string()));
    }

    if data.password.is_empty() {
        return Err(LoginError::MissingField("password".to_string()));
    }

    Ok(())
}

/// Look the user up by email, check the password, and issue a token carrying
/// the capabilities of the user's role.
async fn attempt_login(
    data: &LoginData,
    state: &AppState,
) -> std::result::Result<AuthorizedResponse, LoginError> {
    let row = database::find_by_email(&state.db, &data.email)
        .await
        .map_err(|e| {
            error!("Database error getting user: {}", e);
            LoginError::DatabaseError
        })?
        .ok_or_else(|| {
            warn!("Login for unknown email");
            LoginError::UserNotFound
        })?;

    let password_valid = database::verify_password(&row.password_hash, &data.password)
        .map_err(|e| {
            error!("Password verification error: {}", e);
            LoginError::InternalError
        })?;

    if !password_valid {
        warn!("Invalid password for user ID {}", row.id);
        return Err(LoginError::CredentialMismatch);
    }

    let token = state
        .tokens
        .issue_with_scopes(row.id, &row.role().scopes())
        .map_err(|e| {
            error!("Failed to issue token for user {}: {}", row.id, e);
            LoginError::InternalError
        })?;

    Ok(AuthorizedResponse {
        message: "Login successful".to_string(),
        user: row.to_user(),
        token,
    })
}
