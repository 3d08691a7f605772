//! Storage interface for users, preferences and restaurants.
//!
//! The server only talks to storage through [`Directory`]; `foodme-db`
//! provides the Postgres implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::accounts::{AppUser, NewUser, Preference, PreferenceInput, Reaction, Restaurant};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("storage failure: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait Directory: Send + Sync {
    /// Verifies the backing store is reachable.
    async fn ping(&self) -> Result<(), DirectoryError>;

    async fn get_user(&self, username: &str) -> Result<Option<AppUser>, DirectoryError>;

    /// Fails with [`DirectoryError::Conflict`] if the username is taken.
    async fn create_user(&self, user: &NewUser) -> Result<AppUser, DirectoryError>;

    /// Removes the user with their preferences, reactions and sessions.
    async fn delete_user(&self, username: &str) -> Result<Option<AppUser>, DirectoryError>;

    async fn set_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<(), DirectoryError>;

    async fn create_session(&self, username: &str, token: &str) -> Result<(), DirectoryError>;

    /// Fails with [`DirectoryError::NotFound`] if the user does not exist.
    async fn create_preference(
        &self,
        username: &str,
        input: &PreferenceInput,
    ) -> Result<Preference, DirectoryError>;

    async fn list_preferences(&self, username: &str) -> Result<Vec<Preference>, DirectoryError>;

    /// Returns `None` unless `preference_id` belongs to `username`.
    async fn update_preference(
        &self,
        username: &str,
        preference_id: i64,
        input: &PreferenceInput,
    ) -> Result<Option<Preference>, DirectoryError>;

    /// Returns `None` unless `preference_id` belongs to `username`.
    async fn delete_preference(
        &self,
        username: &str,
        preference_id: i64,
    ) -> Result<Option<Preference>, DirectoryError>;

    /// Returns `false` unless `preference_id` belongs to `username`.
    async fn set_default_preference(
        &self,
        username: &str,
        preference_id: i64,
    ) -> Result<bool, DirectoryError>;

    async fn get_default_preference(
        &self,
        username: &str,
    ) -> Result<Option<Preference>, DirectoryError>;

    /// Fails with [`DirectoryError::Conflict`] if the id already exists.
    async fn create_restaurant(&self, id: &str, name: &str) -> Result<Restaurant, DirectoryError>;

    /// Marks `restaurant` for the user, creating the restaurant record if
    /// needed and clearing the opposite mark.
    async fn add_reaction(
        &self,
        username: &str,
        reaction: Reaction,
        restaurant: &Restaurant,
    ) -> Result<Restaurant, DirectoryError>;

    /// Returns `false` if the user held no such mark.
    async fn remove_reaction(
        &self,
        username: &str,
        reaction: Reaction,
        restaurant_id: &str,
    ) -> Result<bool, DirectoryError>;

    async fn list_reactions(
        &self,
        username: &str,
        reaction: Reaction,
    ) -> Result<Vec<Restaurant>, DirectoryError>;
}
