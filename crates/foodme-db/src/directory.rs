//! Postgres-backed [`Directory`].

use async_trait::async_trait;
use sqlx::PgPool;

use foodme_core::{
    AppUser, Directory, DirectoryError, NewUser, Preference, PreferenceInput, Reaction, Restaurant,
};

use crate::{preferences, restaurants, users, DbError};

impl From<DbError> for DirectoryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(message) => Self::Conflict(message),
            DbError::NotFound(entity) => Self::NotFound(entity),
            other => Self::Storage(Box::new(other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn ping(&self) -> Result<(), DirectoryError> {
        crate::ping(&self.pool)
            .await
            .map_err(|e| DirectoryError::from(DbError::Sqlx(e)))
    }

    async fn get_user(&self, username: &str) -> Result<Option<AppUser>, DirectoryError> {
        Ok(users::get_user(&self.pool, username).await?.map(AppUser::from))
    }

    async fn create_user(&self, user: &NewUser) -> Result<AppUser, DirectoryError> {
        Ok(users::create_user(&self.pool, user).await?.into())
    }

    async fn delete_user(&self, username: &str) -> Result<Option<AppUser>, DirectoryError> {
        Ok(users::delete_user(&self.pool, username)
            .await?
            .map(AppUser::from))
    }

    async fn set_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<(), DirectoryError> {
        users::update_password_hash(&self.pool, username, password_hash).await?;
        Ok(())
    }

    async fn create_session(&self, username: &str, token: &str) -> Result<(), DirectoryError> {
        users::create_session(&self.pool, username, token).await?;
        Ok(())
    }

    async fn create_preference(
        &self,
        username: &str,
        input: &PreferenceInput,
    ) -> Result<Preference, DirectoryError> {
        Ok(preferences::create_preference(&self.pool, username, input).await?)
    }

    async fn list_preferences(&self, username: &str) -> Result<Vec<Preference>, DirectoryError> {
        Ok(preferences::list_preferences(&self.pool, username).await?)
    }

    async fn update_preference(
        &self,
        username: &str,
        preference_id: i64,
        input: &PreferenceInput,
    ) -> Result<Option<Preference>, DirectoryError> {
        Ok(preferences::update_preference(&self.pool, username, preference_id, input).await?)
    }

    async fn delete_preference(
        &self,
        username: &str,
        preference_id: i64,
    ) -> Result<Option<Preference>, DirectoryError> {
        Ok(preferences::delete_preference(&self.pool, username, preference_id).await?)
    }

    async fn set_default_preference(
        &self,
        username: &str,
        preference_id: i64,
    ) -> Result<bool, DirectoryError> {
        Ok(preferences::set_default_preference(&self.pool, username, preference_id).await?)
    }

    async fn get_default_preference(
        &self,
        username: &str,
    ) -> Result<Option<Preference>, DirectoryError> {
        Ok(preferences::get_default_preference(&self.pool, username).await?)
    }

    async fn create_restaurant(&self, id: &str, name: &str) -> Result<Restaurant, DirectoryError> {
        Ok(restaurants::create_restaurant(&self.pool, id, name)
            .await?
            .into())
    }

    async fn add_reaction(
        &self,
        username: &str,
        reaction: Reaction,
        restaurant: &Restaurant,
    ) -> Result<Restaurant, DirectoryError> {
        Ok(
            restaurants::add_reaction(&self.pool, username, reaction, restaurant)
                .await?
                .into(),
        )
    }

    async fn remove_reaction(
        &self,
        username: &str,
        reaction: Reaction,
        restaurant_id: &str,
    ) -> Result<bool, DirectoryError> {
        Ok(restaurants::remove_reaction(&self.pool, username, reaction, restaurant_id).await?)
    }

    async fn list_reactions(
        &self,
        username: &str,
        reaction: Reaction,
    ) -> Result<Vec<Restaurant>, DirectoryError> {
        let rows = restaurants::list_reactions(&self.pool, username, reaction).await?;
        Ok(rows.into_iter().map(Restaurant::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_not_found_keep_their_kind() {
        assert!(matches!(
            DirectoryError::from(DbError::Conflict("Restaurant already exists".to_owned())),
            DirectoryError::Conflict(ref m) if m == "Restaurant already exists"
        ));
        assert!(matches!(
            DirectoryError::from(DbError::NotFound("user")),
            DirectoryError::NotFound("user")
        ));
    }

    #[test]
    fn other_errors_become_storage_failures() {
        let err = DirectoryError::from(DbError::Sqlx(sqlx::Error::RowNotFound));
        assert!(matches!(err, DirectoryError::Storage(_)));

        let err = DirectoryError::from(DbError::InvalidRow("bad".to_owned()));
        assert!(matches!(err, DirectoryError::Storage(_)));
    }
}
