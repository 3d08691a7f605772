//! Queries against `app_users` and `sessions`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use foodme_core::{AppUser, NewUser};

use crate::{sqlstate, DbError, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub default_preference_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for AppUser {
    fn from(row: UserRow) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            default_preference_id: row.default_preference_id,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "username, first_name, last_name, email, password_hash, default_preference_id, created_at";

/// Fetch a user by username.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user(pool: &PgPool, username: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM app_users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Insert a new user.
///
/// # Errors
///
/// Returns [`DbError::Conflict`] if the username is taken, or
/// [`DbError::Sqlx`] on any other failure.
pub async fn create_user(pool: &PgPool, user: &NewUser) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO app_users (username, first_name, last_name, email, password_hash) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| match sqlstate(&e).as_deref() {
        Some(UNIQUE_VIOLATION) => DbError::Conflict("Username already exists".to_owned()),
        _ => DbError::Sqlx(e),
    })
}

/// Delete a user; preferences, reactions and sessions cascade.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_user(pool: &PgPool, username: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "DELETE FROM app_users WHERE username = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Replace a user's stored password hash.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such user exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_password_hash(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE app_users SET password_hash = $2, updated_at = NOW() WHERE username = $1",
    )
    .bind(username)
    .bind(password_hash)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound("user"));
    }
    Ok(())
}

/// Record a login session token for a user.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the user does not exist, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_session(pool: &PgPool, username: &str, token: &str) -> Result<(), DbError> {
    sqlx::query("INSERT INTO sessions (token, username) VALUES ($1, $2)")
        .bind(token)
        .bind(username)
        .execute(pool)
        .await
        .map_err(|e| match sqlstate(&e).as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => DbError::NotFound("user"),
            _ => DbError::Sqlx(e),
        })?;
    Ok(())
}
