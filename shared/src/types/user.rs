use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::jwt::SCOPE_LIST_USERS;

/// Longest email the `users` table accepts.
pub const MAX_EMAIL_LEN: usize = 191;

/// Read-only view of a stored user, as handed to clients.
///
/// The password hash and role never leave the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip)]
    pub role: Role,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl User {
    /// Listing projection: only name and email carry real values, id and
    /// timestamps are left at their zero values.
    pub fn name_and_email(name: String, email: String) -> Self {
        Self {
            id: 0,
            email,
            name,
            role: Role::default(),
            created_on: DateTime::<Utc>::default(),
            updated_on: DateTime::<Utc>::default(),
        }
    }
}

/// Account role persisted alongside the user. Drives the capabilities
/// placed in issued tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Capabilities granted to tokens issued for this role.
    pub fn scopes(&self) -> Vec<String> {
        match self {
            Self::Admin => vec![SCOPE_LIST_USERS.to_string()],
            Self::Member => Vec::new(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Body returned by register and login on success.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizedResponse {
    pub message: String,
    pub user: User,
    pub token: String,
}
