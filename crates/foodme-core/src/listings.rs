//! Restaurant candidates and the listings provider interface.
//!
//! A [`Candidate`] is a query-scoped snapshot of one restaurant as reported by
//! the provider. Nothing here is persisted.

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CoreError;

/// Ordinal price tier, `1` (cheapest) through `4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PriceTier(u8);

impl PriceTier {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPriceTier`] outside `1..=4`.
    pub fn new(level: u8) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(CoreError::InvalidPriceTier(level.to_string()))
        }
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self.0
    }
}

impl FromStr for PriceTier {
    type Err = CoreError;

    /// Accepts `1`..`4` or `$`..`$$$$`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || CoreError::InvalidPriceTier(s.to_string());

        if !trimmed.is_empty() && trimmed.chars().all(|c| c == '$') {
            let level = u8::try_from(trimmed.len()).map_err(|_| invalid())?;
            return Self::new(level).map_err(|_| invalid());
        }

        let level = trimmed.parse::<u8>().map_err(|_| invalid())?;
        Self::new(level).map_err(|_| invalid())
    }
}

impl TryFrom<u8> for PriceTier {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PriceTier> for u8 {
    fn from(tier: PriceTier) -> Self {
        tier.0
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result ordering requested from the provider, also stored on preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    BestMatch,
    Rating,
    ReviewCount,
    Distance,
}

impl SortBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::BestMatch => "best_match",
            SortBy::Rating => "rating",
            SortBy::ReviewCount => "review_count",
            SortBy::Distance => "distance",
        }
    }
}

impl FromStr for SortBy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "best_match" => Ok(SortBy::BestMatch),
            "rating" => Ok(SortBy::Rating),
            "review_count" => Ok(SortBy::ReviewCount),
            "distance" => Ok(SortBy::Distance),
            other => Err(CoreError::InvalidSortBy(other.to_string())),
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where to search: a free-text place or a coordinate pair, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Place(String),
    Coordinates { longitude: f64, latitude: f64 },
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Place(place) => f.write_str(place),
            LocationQuery::Coordinates {
                longitude,
                latitude,
            } => write!(f, "({longitude}, {latitude})"),
        }
    }
}

/// Filter criteria forwarded to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    /// Search radius in meters.
    pub radius_m: Option<u32>,
    pub price: Option<PriceTier>,
    pub cuisine: Option<String>,
    pub sort_by: SortBy,
    pub limit: u32,
}

impl SearchFilters {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 50;
    pub const MAX_RADIUS_M: u32 = 40_000;
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            radius_m: None,
            price: None,
            cuisine: None,
            sort_by: SortBy::BestMatch,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One restaurant returned by the provider for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Meters from the query point; always finite and non-negative.
    pub distance: f64,
    pub price: Option<PriceTier>,
    pub cuisines: Vec<String>,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("listings provider request failed: {0}")]
    Request(String),

    #[error("listings provider returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Source of restaurant candidates.
#[async_trait]
pub trait ListingsProvider: Send + Sync {
    async fn find_by_location(
        &self,
        location: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ProviderError>;

    async fn find_by_coordinates(
        &self,
        longitude: f64,
        latitude: f64,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ProviderError>;
}
