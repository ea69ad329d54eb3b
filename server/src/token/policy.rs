use std::fmt;

use shared::types::TokenClaims;
use shared::types::server_config::AuthConfig;

/// Why a correctly signed token was still refused.
///
/// This is a negative answer, not a failure: the token was readable and
/// authentic, it just does not grant what was asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimMismatch {
    Audience,
    Issuer,
    Subject,
    NotYetValid,
    Expired,
}

impl fmt::Display for ClaimMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Audience => "audience does not match",
            Self::Issuer => "issuer does not match",
            Self::Subject => "subject does not match",
            Self::NotYetValid => "token is not valid yet",
            Self::Expired => "token has expired",
        };
        f.write_str(reason)
    }
}

/// The fixed claim values a deployment issues and accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    pub issuer: String,
    pub audience: String,
    pub subject_prefix: String,
    /// Seconds between `iat` and `exp`.
    pub validity_secs: i64,
    /// Seconds between `iat` and `nbf`.
    pub not_before_secs: i64,
}

impl From<&AuthConfig> for TokenPolicy {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            issuer: auth.issuer.clone(),
            audience: auth.audience.clone(),
            subject_prefix: auth.subject_prefix.clone(),
            validity_secs: i64::try_from(auth.token_validity_secs()).unwrap_or(i64::MAX),
            not_before_secs: i64::try_from(auth.not_before_secs).unwrap_or(i64::MAX),
        }
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl TokenPolicy {
    pub fn subject_for(&self, user_id: i64) -> String {
        format!("{}{}", self.subject_prefix, user_id)
    }

    /// Inverse of [`subject_for`](Self::subject_for). Only the exact form
    /// `subject_for` produces is accepted: plain decimal digits, no leading
    /// zeros.
    pub fn user_id_from_subject(&self, subject: &str) -> Option<i64> {
        let digits = subject.strip_prefix(&self.subject_prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        digits.parse().ok()
    }

    pub fn claims_for(&self, user_id: i64, scopes: &[String], now: i64) -> TokenClaims {
        TokenClaims {
            iss: self.issuer.clone(),
            sub: self.subject_for(user_id),
            aud: self.audience.clone(),
            exp: now.saturating_add(self.validity_secs),
            nbf: now.saturating_add(self.not_before_secs),
            iat: now,
            scope: scopes.to_vec(),
        }
    }

    /// Check every claim against the policy at instant `now`.
    ///
    /// With `expected_user` set the subject must name exactly that user;
    /// without it any well-formed subject is accepted. Returns the user id
    /// named by the subject.
    pub fn check(
        &self,
        claims: &TokenClaims,
        expected_user: Option<i64>,
        now: i64,
    ) -> Result<i64, ClaimMismatch> {
        if claims.aud != self.audience {
            return Err(ClaimMismatch::Audience);
        }
        if claims.iss != self.issuer {
            return Err(ClaimMismatch::Issuer);
        }

        let user_id = match expected_user {
            Some(expected) if claims.sub == self.subject_for(expected) => expected,
            Some(_) => return Err(ClaimMismatch::Subject),
            None => self
                .user_id_from_subject(&claims.sub)
                .ok_or(ClaimMismatch::Subject)?,
        };

        if now < claims.nbf {
            return Err(ClaimMismatch::NotYetValid);
        }
        if now >= claims.exp {
            return Err(ClaimMismatch::Expired);
        }

        Ok(user_id)
    }
}
