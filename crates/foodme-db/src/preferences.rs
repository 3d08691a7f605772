//! Queries against `preferences` and the default-preference pointer on
//! `app_users`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use foodme_core::{Preference, PreferenceInput, PriceTier, SortBy};

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PreferenceRow {
    pub id: i64,
    pub username: String,
    pub price_tier: i16,
    pub location: String,
    pub cuisine: String,
    pub sort_by: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PreferenceRow> for Preference {
    type Error = DbError;

    fn try_from(row: PreferenceRow) -> Result<Self, Self::Error> {
        let price = u8::try_from(row.price_tier)
            .ok()
            .and_then(|level| PriceTier::new(level).ok())
            .ok_or_else(|| {
                DbError::InvalidRow(format!(
                    "preference {} has price tier {}",
                    row.id, row.price_tier
                ))
            })?;
        let sort_by = row.sort_by.parse::<SortBy>().map_err(|e| {
            DbError::InvalidRow(format!("preference {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            username: row.username,
            price,
            location: row.location,
            cuisine: row.cuisine,
            sort_by,
            created_at: row.created_at,
        })
    }
}

const PREFERENCE_COLUMNS: &str = "id, username, price_tier, location, cuisine, sort_by, created_at";

fn collect(rows: Vec<PreferenceRow>) -> Result<Vec<Preference>, DbError> {
    rows.into_iter().map(Preference::try_from).collect()
}

/// Insert a preference for an existing user.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the user does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn create_preference(
    pool: &PgPool,
    username: &str,
    input: &PreferenceInput,
) -> Result<Preference, DbError> {
    // Selecting from app_users makes an unknown user insert zero rows.
    let row = sqlx::query_as::<_, PreferenceRow>(&format!(
        "INSERT INTO preferences (username, price_tier, location, cuisine, sort_by) \
         SELECT username, $2, $3, $4, $5 FROM app_users WHERE username = $1 \
         RETURNING {PREFERENCE_COLUMNS}"
    ))
    .bind(username)
    .bind(i16::from(input.price.level()))
    .bind(&input.location)
    .bind(&input.cuisine)
    .bind(input.sort_by.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound("user"))?;

    Preference::try_from(row)
}

/// All preferences of a user, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or
/// [`DbError::InvalidRow`] if a stored row cannot be decoded.
pub async fn list_preferences(pool: &PgPool, username: &str) -> Result<Vec<Preference>, DbError> {
    let rows = sqlx::query_as::<_, PreferenceRow>(&format!(
        "SELECT {PREFERENCE_COLUMNS} FROM preferences WHERE username = $1 ORDER BY id"
    ))
    .bind(username)
    .fetch_all(pool)
    .await?;
    collect(rows)
}

/// Overwrite a preference owned by `username`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_preference(
    pool: &PgPool,
    username: &str,
    preference_id: i64,
    input: &PreferenceInput,
) -> Result<Option<Preference>, DbError> {
    let row = sqlx::query_as::<_, PreferenceRow>(&format!(
        "UPDATE preferences \
         SET price_tier = $3, location = $4, cuisine = $5, sort_by = $6, updated_at = NOW() \
         WHERE id = $1 AND username = $2 \
         RETURNING {PREFERENCE_COLUMNS}"
    ))
    .bind(preference_id)
    .bind(username)
    .bind(i16::from(input.price.level()))
    .bind(&input.location)
    .bind(&input.cuisine)
    .bind(input.sort_by.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(Preference::try_from).transpose()
}

/// Delete a preference owned by `username`.
///
/// A default pointing at it is cleared by the foreign key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_preference(
    pool: &PgPool,
    username: &str,
    preference_id: i64,
) -> Result<Option<Preference>, DbError> {
    let row = sqlx::query_as::<_, PreferenceRow>(&format!(
        "DELETE FROM preferences WHERE id = $1 AND username = $2 RETURNING {PREFERENCE_COLUMNS}"
    ))
    .bind(preference_id)
    .bind(username)
    .fetch_optional(pool)
    .await?;

    row.map(Preference::try_from).transpose()
}

/// Point the user's default at one of their own preferences.
///
/// Returns `false` when the preference does not belong to the user.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn set_default_preference(
    pool: &PgPool,
    username: &str,
    preference_id: i64,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE app_users SET default_preference_id = $2, updated_at = NOW() \
         WHERE username = $1 \
           AND EXISTS (SELECT 1 FROM preferences WHERE id = $2 AND username = $1)",
    )
    .bind(username)
    .bind(preference_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// The user's default preference, if one is set.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_default_preference(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Preference>, DbError> {
    let row = sqlx::query_as::<_, PreferenceRow>(
        "SELECT p.id, p.username, p.price_tier, p.location, p.cuisine, p.sort_by, p.created_at \
         FROM app_users u \
         JOIN preferences p ON p.id = u.default_preference_id \
         WHERE u.username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    row.map(Preference::try_from).transpose()
}
