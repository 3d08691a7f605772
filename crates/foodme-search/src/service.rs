//! The search service: validation, one provider call, then an ordering or
//! selection policy.

use std::sync::Arc;
use std::time::Duration;

use foodme_core::{
    Candidate, ListingsProvider, LocationQuery, PriceTier, SearchFilters, SortBy,
};

use crate::random::RandomSource;
use crate::SearchError;

/// Stateless search front end over a [`ListingsProvider`].
///
/// Holds shared references only, so one instance serves all requests.
#[derive(Clone)]
pub struct SearchService {
    provider: Arc<dyn ListingsProvider>,
    random: Arc<dyn RandomSource>,
    deadline: Duration,
}

impl SearchService {
    #[must_use]
    pub fn new(
        provider: Arc<dyn ListingsProvider>,
        random: Arc<dyn RandomSource>,
        deadline: Duration,
    ) -> Self {
        Self {
            provider,
            random,
            deadline,
        }
    }

    /// Candidates near `location`, nearest first.
    ///
    /// Equal distances keep the provider's order.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidQuery`] for a bad location or radius,
    /// [`SearchError::ProviderUnavailable`] if the provider fails.
    pub async fn search_by_distance(
        &self,
        location: &LocationQuery,
        radius_m: Option<u32>,
    ) -> Result<Vec<Candidate>, SearchError> {
        validate_location(location)?;
        let filters = SearchFilters {
            radius_m: validate_radius(radius_m)?,
            sort_by: SortBy::Distance,
            ..SearchFilters::default()
        };

        let mut candidates = self.fetch(location, &filters).await?;
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(candidates)
    }

    /// One candidate near `location`, chosen uniformly at random.
    ///
    /// # Errors
    ///
    /// [`SearchError::NoCandidates`] if the provider returns nothing, plus the
    /// errors of [`SearchService::search_by_distance`].
    pub async fn recommend_random(
        &self,
        location: &LocationQuery,
        radius_m: Option<u32>,
    ) -> Result<Candidate, SearchError> {
        validate_location(location)?;
        let filters = SearchFilters {
            radius_m: validate_radius(radius_m)?,
            ..SearchFilters::default()
        };

        let mut candidates = self.fetch(location, &filters).await?;
        if candidates.is_empty() {
            return Err(SearchError::NoCandidates);
        }
        let index = self.random.pick(candidates.len()).min(candidates.len() - 1);
        tracing::debug!(index, pool = candidates.len(), "random recommendation");
        Ok(candidates.swap_remove(index))
    }

    /// Candidates at `price`, in provider order.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidQuery`] for a bad location,
    /// [`SearchError::ProviderUnavailable`] if the provider fails.
    pub async fn search_by_price(
        &self,
        location: &LocationQuery,
        price: PriceTier,
    ) -> Result<Vec<Candidate>, SearchError> {
        validate_location(location)?;
        let filters = SearchFilters {
            price: Some(price),
            ..SearchFilters::default()
        };
        self.fetch(location, &filters).await
    }

    /// Candidates serving `cuisine`, in provider order.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidQuery`] for a bad location or blank cuisine,
    /// [`SearchError::ProviderUnavailable`] if the provider fails.
    pub async fn search_by_cuisine(
        &self,
        location: &LocationQuery,
        cuisine: &str,
    ) -> Result<Vec<Candidate>, SearchError> {
        validate_location(location)?;
        let cuisine = cuisine.trim();
        if cuisine.is_empty() {
            return Err(SearchError::InvalidQuery("cuisine is required".to_owned()));
        }
        let filters = SearchFilters {
            cuisine: Some(cuisine.to_owned()),
            ..SearchFilters::default()
        };
        self.fetch(location, &filters).await
    }

    async fn fetch(
        &self,
        location: &LocationQuery,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, SearchError> {
        let call = async {
            match location {
                LocationQuery::Place(place) => {
                    self.provider.find_by_location(place, filters).await
                }
                LocationQuery::Coordinates {
                    longitude,
                    latitude,
                } => {
                    self.provider
                        .find_by_coordinates(*longitude, *latitude, filters)
                        .await
                }
            }
        };

        let result = tokio::time::timeout(self.deadline, call).await.map_err(|_| {
            tracing::warn!(
                %location,
                deadline_ms = self.deadline.as_millis(),
                "listings provider missed its deadline"
            );
            SearchError::ProviderUnavailable(format!(
                "no response within {} ms",
                self.deadline.as_millis()
            ))
        })?;

        let candidates = result.map_err(|e| {
            tracing::error!(%location, error = %e, "listings provider failed");
            SearchError::ProviderUnavailable(e.to_string())
        })?;

        tracing::info!(%location, count = candidates.len(), "listings fetched");
        Ok(candidates)
    }
}

fn validate_location(location: &LocationQuery) -> Result<(), SearchError> {
    match location {
        LocationQuery::Place(place) if place.trim().is_empty() => Err(SearchError::InvalidQuery(
            "location is required".to_owned(),
        )),
        LocationQuery::Place(_) => Ok(()),
        LocationQuery::Coordinates {
            longitude,
            latitude,
        } => {
            let valid = longitude.is_finite()
                && latitude.is_finite()
                && longitude.abs() <= 180.0
                && latitude.abs() <= 90.0;
            if valid {
                Ok(())
            } else {
                Err(SearchError::InvalidQuery(format!(
                    "coordinates out of range: {location}"
                )))
            }
        }
    }
}

fn validate_radius(radius_m: Option<u32>) -> Result<Option<u32>, SearchError> {
    match radius_m {
        Some(r) if r == 0 || r > SearchFilters::MAX_RADIUS_M => Err(SearchError::InvalidQuery(
            format!(
                "radius must be between 1 and {} meters, got {r}",
                SearchFilters::MAX_RADIUS_M
            ),
        )),
        other => Ok(other),
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
