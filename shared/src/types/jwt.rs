use serde::{Deserialize, Serialize};

/// Capability granted to callers allowed to list every user.
pub const SCOPE_LIST_USERS: &str = "users:list";

/// Claims embedded in every token issued by the server.
///
/// The token is the only record of a login: nothing is stored server-side,
/// so every check happens against these fields and the signature at
/// verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer, fixed per deployment.
    pub iss: String,

    /// Subject prefix followed by the decimal user id, e.g. `uid-42`.
    pub sub: String,

    /// Audience, fixed per deployment.
    pub aud: String,

    /// Expiry (Unix timestamp, seconds). Valid while `now < exp`.
    pub exp: i64,

    /// Not-before (Unix timestamp, seconds). Valid once `now >= nbf`.
    pub nbf: i64,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,

    /// Capabilities carried by the bearer, e.g. [`SCOPE_LIST_USERS`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
}

impl TokenClaims {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }
}
