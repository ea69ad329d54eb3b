use hyper::{Request, StatusCode};
use tracing::{error, info};

use crate::AppState;
use crate::database;
use crate::handlers::http::utils::{
    HttpResult, RequestBody, deliver_error_json, deliver_serialized_json,
};
use crate::token::Authenticated;

/// `GET /v1/user/all`
///
/// The router has already checked the caller's capability. Returns up to
/// `users.list_limit` users with only name and email filled in.
pub async fn handle_list_users(
    _req: Request<RequestBody>,
    state: AppState,
    caller: Authenticated,
) -> HttpResult {
    let limit = state.config.users.list_limit;

    match database::list_names_and_emails(&state.db, limit).await {
        Ok(users) => {
            info!("User {} listed {} users", caller.user_id, users.len());
            deliver_serialized_json(&users, StatusCode::OK)
        }
        Err(e) => {
            error!("Failed to list users: {}", e);
            deliver_error_json(
                "DATABASE_ERROR",
                "Failed to read users",
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}
