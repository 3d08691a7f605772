//! Queries against `restaurants` and `restaurant_reactions`.

use sqlx::PgPool;

use foodme_core::{Reaction, Restaurant};

use crate::{sqlstate, DbError, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RestaurantRow {
    pub id: String,
    pub name: String,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// Insert a restaurant record.
///
/// # Errors
///
/// Returns [`DbError::Conflict`] if the id already exists, or
/// [`DbError::Sqlx`] on any other failure.
pub async fn create_restaurant(pool: &PgPool, id: &str, name: &str) -> Result<RestaurantRow, DbError> {
    sqlx::query_as::<_, RestaurantRow>(
        "INSERT INTO restaurants (id, name) VALUES ($1, $2) RETURNING id, name",
    )
    .bind(id)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| match sqlstate(&e).as_deref() {
        Some(UNIQUE_VIOLATION) => DbError::Conflict("Restaurant already exists".to_owned()),
        _ => DbError::Sqlx(e),
    })
}

/// Mark a restaurant as liked or disliked for a user.
///
/// Runs in one transaction: the restaurant row is created if missing, the
/// opposite mark is removed and the requested mark is inserted unless it
/// already exists. Returns the stored restaurant record.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the user does not exist, or
/// [`DbError::Sqlx`] if any statement fails.
pub async fn add_reaction(
    pool: &PgPool,
    username: &str,
    reaction: Reaction,
    restaurant: &Restaurant,
) -> Result<RestaurantRow, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO restaurants (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
        .bind(&restaurant.id)
        .bind(&restaurant.name)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "DELETE FROM restaurant_reactions \
         WHERE username = $1 AND restaurant_id = $2 AND reaction = $3",
    )
    .bind(username)
    .bind(&restaurant.id)
    .bind(reaction.opposite().as_str())
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO restaurant_reactions (username, restaurant_id, reaction) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (username, restaurant_id, reaction) DO NOTHING",
    )
    .bind(username)
    .bind(&restaurant.id)
    .bind(reaction.as_str())
    .execute(&mut *tx)
    .await
    .map_err(|e| match sqlstate(&e).as_deref() {
        Some(FOREIGN_KEY_VIOLATION) => DbError::NotFound("user"),
        _ => DbError::Sqlx(e),
    })?;

    let stored =
        sqlx::query_as::<_, RestaurantRow>("SELECT id, name FROM restaurants WHERE id = $1")
            .bind(&restaurant.id)
            .fetch_one(&mut *tx)
            .await?;

    tx.commit().await?;
    Ok(stored)
}

/// Remove one mark. Returns `false` if the user held no such mark.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn remove_reaction(
    pool: &PgPool,
    username: &str,
    reaction: Reaction,
    restaurant_id: &str,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "DELETE FROM restaurant_reactions \
         WHERE username = $1 AND restaurant_id = $2 AND reaction = $3",
    )
    .bind(username)
    .bind(restaurant_id)
    .bind(reaction.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Restaurants a user marked with `reaction`, in the order they were marked.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reactions(
    pool: &PgPool,
    username: &str,
    reaction: Reaction,
) -> Result<Vec<RestaurantRow>, DbError> {
    let rows = sqlx::query_as::<_, RestaurantRow>(
        "SELECT r.id, r.name \
         FROM restaurant_reactions rr \
         JOIN restaurants r ON r.id = rr.restaurant_id \
         WHERE rr.username = $1 AND rr.reaction = $2 \
         ORDER BY rr.created_at, r.id",
    )
    .bind(username)
    .bind(reaction.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
