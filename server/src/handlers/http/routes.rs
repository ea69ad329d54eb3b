use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use hyper::{Method, Request, Response, StatusCode};
use tracing::{debug, warn};

use shared::types::SCOPE_LIST_USERS;

use crate::AppState;
use crate::handlers::http::utils::{
    RequestBody, ResponseBody, deliver_error_json, deliver_serialized_json, deliver_text,
    extract_token,
};
use crate::handlers::http::{auth, users};
use crate::token::Authenticated;

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
// Two security tiers:
//
//   RouteHandler   no auth. Receives (req, state).
//                  Use for: /, /health, login, register.
//
//   ScopedHandler  bearer token verified and required capability present.
//                  Receives (req, state, caller).

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response<ResponseBody>>> + Send>>;

type RouteHandler = Box<dyn Fn(Request<RequestBody>, AppState) -> HandlerFuture + Send + Sync>;

type ScopedHandler =
    Box<dyn Fn(Request<RequestBody>, AppState, Authenticated) -> HandlerFuture + Send + Sync>;

// ---------------------------------------------------------------------------
// RouteKind
// ---------------------------------------------------------------------------

enum RouteKind {
    /// No authentication check.
    Open(RouteHandler),

    /// Token must authenticate and carry `scope`.
    Scoped {
        scope: &'static str,
        handler: ScopedHandler,
    },
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Open (no auth) ────────────────────────────────────────────────────────

    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.open(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.open(Method::POST, path, handler)
    }

    fn open<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |req, state| Box::pin(handler(req, state)))),
        });
        self
    }

    // ── Scoped (bearer token + capability) ───────────────────────────────────
    //
    // The router authenticates the token and checks the scope before the
    // handler is called. Handlers receive the `Authenticated` caller and must
    // NOT repeat the check.

    pub fn get_scoped<F, Fut>(mut self, path: &str, scope: &'static str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState, Authenticated) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::GET,
            path: path.to_string(),
            kind: RouteKind::Scoped {
                scope,
                handler: Box::new(move |req, state, caller| {
                    Box::pin(handler(req, state, caller))
                }),
            },
        });
        self
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    pub async fn route(
        &self,
        req: Request<RequestBody>,
        state: AppState,
    ) -> Result<Response<ResponseBody>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let Some(route) = self
            .routes
            .iter()
            .find(|r| r.method == method && Self::path_matches(&r.path, &path))
        else {
            debug!("No route for {} {}", method, path);
            return deliver_error_json("NOT_FOUND", "Endpoint not found", StatusCode::NOT_FOUND)
                .context("Failed to deliver 404 response");
        };

        match &route.kind {
            RouteKind::Open(h) => h(req, state).await,

            RouteKind::Scoped { scope, handler } => {
                let Some(token) = extract_token(req.headers()) else {
                    warn!("Rejected {} {}: no authorization header", method, path);
                    return unauthorized();
                };

                let caller = match state.tokens.authenticate(&token) {
                    Ok(caller) => caller,
                    Err(reason) => {
                        warn!("Rejected {} {}: {}", method, path, reason);
                        return unauthorized();
                    }
                };

                if !caller.has_scope(scope) {
                    warn!(
                        "Rejected {} {}: user {} lacks {}",
                        method, path, caller.user_id, scope
                    );
                    return forbidden();
                }

                handler(req, state, caller).await
            }
        }
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    /// Exact match, ignoring ASCII case and any query string.
    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        let clean = request_path.split('?').next().unwrap_or(request_path);
        route_path.eq_ignore_ascii_case(clean)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unauthorized() -> Result<Response<ResponseBody>> {
    deliver_error_json(
        "UNAUTHORIZED",
        "Authentication required",
        StatusCode::UNAUTHORIZED,
    )
    .context("Failed to deliver 401 response")
}

fn forbidden() -> Result<Response<ResponseBody>> {
    deliver_error_json(
        "FORBIDDEN",
        "Insufficient privileges",
        StatusCode::FORBIDDEN,
    )
    .context("Failed to deliver 403 response")
}

pub const BANNER: &str = "userkey api: register, login and list users under /v1/user";

// ---------------------------------------------------------------------------
// API router
//
// Auth tier is enforced here at the routing level. The contract is:
//
//   .get(...) / .post(...)  → Open    handler gets (req, state)
//   .get_scoped(...)        → Scoped  handler gets (req, state, caller)
// ---------------------------------------------------------------------------

pub fn build_api_router() -> Router {
    Router::new()
        .get("/", |_req, _state| async move {
            deliver_text(BANNER, StatusCode::OK).context("Failed to deliver banner")
        })
        .get("/health", |_req, _state| async move {
            deliver_serialized_json(
                &serde_json::json!({ "status": "success", "health": "ok" }),
                StatusCode::OK,
            )
            .context("Failed to deliver health response")
        })
        .post("/v1/user/register", |req, state| async move {
            auth::handle_register(req, state)
                .await
                .context("Registration failed")
        })
        .post("/v1/user/login", |req, state| async move {
            auth::handle_login(req, state).await.context("Login failed")
        })
        .get_scoped(
            "/v1/user/all",
            SCOPE_LIST_USERS,
            |req, state, caller| async move {
                users::handle_list_users(req, state, caller)
                    .await
                    .context("User listing failed")
            },
        )
}
