//! Stateless bearer tokens.
//!
//! Tokens are RS512-signed JWTs. The server keeps no record of issued
//! tokens, so a token is valid exactly when its signature verifies and its
//! claims pass the [`TokenPolicy`] at the moment it is presented.

pub mod keys;
pub mod policy;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, Header};
use thiserror::Error;
use tracing::debug;

use shared::types::TokenClaims;
use shared::types::server_config::AuthConfig;

pub use self::keys::KeyPair;
pub use self::policy::{ClaimMismatch, TokenPolicy};

/// The only algorithm tokens are signed and accepted with.
pub const ALGORITHM: Algorithm = Algorithm::RS512;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("failed to load key {path}: {reason}")]
    KeyLoad { path: String, reason: String },

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token claims: {0}")]
    MalformedClaims(String),
}

/// Outcome of checking a readable, authentic token against an expected user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(ClaimMismatch),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A caller whose token passed every check.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user_id: i64,
    pub claims: TokenClaims,
}

impl Authenticated {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.claims.has_scope(scope)
    }
}

/// Why [`TokenService::authenticate`] refused a token.
#[derive(Error, Debug)]
pub enum Rejection {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("token rejected: {0}")]
    Claims(ClaimMismatch),
}

#[derive(Debug, Clone)]
pub struct TokenService {
    keys: KeyPair,
    policy: TokenPolicy,
}

impl TokenService {
    pub fn new(keys: KeyPair, policy: TokenPolicy) -> Self {
        Self { keys, policy }
    }

    /// Load the key pair named in the config once; every later operation
    /// reuses it.
    pub fn from_config(auth: &AuthConfig) -> Result<Self, TokenError> {
        let keys = KeyPair::load(&auth.private_key_path, &auth.public_key_path)?;
        Ok(Self::new(keys, TokenPolicy::from(auth)))
    }

    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// Issue a token for `user_id` carrying no capabilities.
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        self.issue_with_scopes(user_id, &[])
    }

    pub fn issue_with_scopes(&self, user_id: i64, scopes: &[String]) -> Result<String, TokenError> {
        self.issue_at(user_id, scopes, now())
    }

    pub fn issue_at(&self, user_id: i64, scopes: &[String], now: i64) -> Result<String, TokenError> {
        let claims = self.policy.claims_for(user_id, scopes, now);
        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.keys.encoding)
            .map_err(TokenError::Signing)
    }

    /// Is `token` a currently valid credential for `expected_user`?
    ///
    /// Structural and cryptographic failures are errors; claims that simply
    /// do not match come back as `Ok(Validity::Invalid(_))`.
    pub fn validate(&self, token: &str, expected_user: i64) -> Result<Validity, TokenError> {
        self.validate_at(token, expected_user, now())
    }

    pub fn validate_at(
        &self,
        token: &str,
        expected_user: i64,
        now: i64,
    ) -> Result<Validity, TokenError> {
        let claims = self.verify(token)?;
        Ok(match self.policy.check(&claims, Some(expected_user), now) {
            Ok(_) => Validity::Valid,
            Err(mismatch) => {
                debug!("Token for {} refused: {}", claims.sub, mismatch);
                Validity::Invalid(mismatch)
            }
        })
    }

    /// Accept a token for whichever user its subject names.
    pub fn authenticate(&self, token: &str) -> Result<Authenticated, Rejection> {
        self.authenticate_at(token, now())
    }

    pub fn authenticate_at(&self, token: &str, now: i64) -> Result<Authenticated, Rejection> {
        let claims = self.verify(token)?;
        let user_id = self
            .policy
            .check(&claims, None, now)
            .map_err(Rejection::Claims)?;
        Ok(Authenticated { user_id, claims })
    }

    /// Check structure and signature, then decode the claims. No claim
    /// values are judged here.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let (message, signature) = split_token(token)?;

        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| TokenError::MalformedToken(format!("unreadable header: {}", e)))?;
        if header.alg != ALGORITHM {
            debug!("Token signed with unexpected algorithm {:?}", header.alg);
            return Err(TokenError::InvalidSignature);
        }

        let verified = jsonwebtoken::crypto::verify(
            signature,
            message.as_bytes(),
            &self.keys.decoding,
            ALGORITHM,
        )
        .map_err(|e| {
            debug!("Signature check failed: {}", e);
            TokenError::InvalidSignature
        })?;
        if !verified {
            return Err(TokenError::InvalidSignature);
        }

        // `message` is `header.payload`; the split above guarantees the dot.
        let payload = message
            .split_once('.')
            .map(|(_, payload)| payload)
            .ok_or_else(|| TokenError::MalformedToken("missing payload".into()))?;
        decode_claims(payload)
    }
}

/// Split `header.payload.signature` into the signed message and the signature.
fn split_token(token: &str) -> Result<(&str, &str), TokenError> {
    let segments = token.split('.').count();
    if segments != 3 {
        return Err(TokenError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments
        )));
    }

    match token.rsplit_once('.') {
        Some((message, signature)) if !signature.is_empty() => Ok((message, signature)),
        _ => Err(TokenError::MalformedToken("empty signature".into())),
    }
}

fn decode_claims(payload: &str) -> Result<TokenClaims, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::MalformedClaims(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::MalformedClaims(e.to_string()))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
