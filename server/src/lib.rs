//! HTTP API for user registration, login and capability-gated listing.
//!
//! Users authenticate with stateless RS512 bearer tokens minted by
//! [`token::TokenService`]; accounts live in SQLite behind [`database`].

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Request, Response};
use sqlx::SqlitePool;
use tracing::error;

use shared::types::server_config::AppConfig;

pub mod database;
pub mod handlers;
pub mod token;

use handlers::http::Router;
use handlers::http::utils::{ResponseBody, internal_error_response};
use token::TokenService;

/// Everything a handler needs. Cheap to clone: one per request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig, tokens: TokenService) -> Self {
        Self {
            db,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        }
    }
}

/// Connection-level entry point: route the request and turn any handler
/// error into a JSON 500 so the connection never sees an `Err`.
pub async fn serve_request(
    router: Arc<Router>,
    state: AppState,
    req: Request<Incoming>,
) -> Result<Response<ResponseBody>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match router.route(req.map(|body| body.boxed_unsync()), state).await {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("{} {} failed: {:#}", method, path, e);
            Ok(internal_error_response())
        }
    }
}
