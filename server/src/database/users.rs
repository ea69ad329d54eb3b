use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use shared::types::{Role, User};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("email is already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// A full `users` row, password hash included. Never leaves the server;
/// convert with [`UserRow::to_user`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_else(|e| {
            warn!("User {} has {}; treating as member", self.id, e);
            Role::Member
        })
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role(),
            created_on: self.created_on,
            updated_on: self.updated_on,
        }
    }
}

const SELECT_USER: &str =
    "SELECT id, email, password_hash, name, role, created_on, updated_on FROM users";

/// Insert a user and return the stored row. The very first user becomes admin.
///
/// The role is decided inside the INSERT so two concurrent first
/// registrations cannot both become admin.
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<UserRow, StoreError> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO users (email, password_hash, name, role, created_on, updated_on)
         VALUES (?, ?, ?,
                 CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'member' ELSE 'admin' END,
                 ?, ?)",
    )
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        other => StoreError::Database(other),
    })?;

    let id = result.last_insert_rowid();
    let row = find_by_id(pool, id)
        .await?
        .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;

    info!("New user made! id:{} role:{}", row.id, row.role);
    Ok(row)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserRow>, StoreError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = ?1", SELECT_USER))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Exact, case-sensitive match on the stored email.
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>, StoreError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE email = ?1", SELECT_USER))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Listing projection: at most `limit` users in id order, only name and email
/// filled in.
pub async fn list_names_and_emails(pool: &SqlitePool, limit: u32) -> Result<Vec<User>, StoreError> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT name, email FROM users ORDER BY id LIMIT ?1",
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(name, email)| User::name_and_email(name, email))
        .collect())
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64, StoreError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
