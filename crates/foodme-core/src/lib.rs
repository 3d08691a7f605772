use thiserror::Error;

pub mod accounts;
pub mod app_config;
pub mod config;
pub mod directory;
pub mod listings;
pub mod password;

pub use accounts::{AppUser, NewUser, Preference, PreferenceInput, Reaction, Restaurant};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use directory::{Directory, DirectoryError};
pub use listings::{
    Candidate, Coordinates, ListingsProvider, LocationQuery, PriceTier, ProviderError,
    SearchFilters, SortBy,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("price must be 1-4 or $-$$$$, got '{0}'")]
    InvalidPriceTier(String),

    #[error("sort_by must be one of best_match, rating, review_count, distance, got '{0}'")]
    InvalidSortBy(String),

    #[error("reaction must be 'liked' or 'disliked', got '{0}'")]
    InvalidReaction(String),
}
