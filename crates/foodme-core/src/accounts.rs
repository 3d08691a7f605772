//! Users, dining preferences and restaurant records kept by the directory.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listings::{PriceTier, SortBy};
use crate::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub default_preference_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create an account. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preference {
    pub id: i64,
    pub username: String,
    pub price: PriceTier,
    pub location: String,
    pub cuisine: String,
    pub sort_by: SortBy,
    pub created_at: DateTime<Utc>,
}

/// The editable part of a [`Preference`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceInput {
    pub price: PriceTier,
    pub location: String,
    pub cuisine: String,
    pub sort_by: SortBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
}

/// A user's mark on a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Liked,
    Disliked,
}

impl Reaction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::Liked => "liked",
            Reaction::Disliked => "disliked",
        }
    }

    /// The mark that is cleared when this one is set.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Reaction::Liked => Reaction::Disliked,
            Reaction::Disliked => Reaction::Liked,
        }
    }
}

impl FromStr for Reaction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "liked" => Ok(Reaction::Liked),
            "disliked" => Ok(Reaction::Disliked),
            other => Err(CoreError::InvalidReaction(other.to_string())),
        }
    }
}

impl std::fmt::Display for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
