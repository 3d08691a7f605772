//! HTTP client for the restaurant listings API.
//!
//! Wraps `reqwest` with bearer-key auth, query construction for the
//! `businesses/search` endpoint, and typed error handling. The client
//! implements [`ListingsProvider`] so the search service never sees HTTP.

use std::time::Duration;

use async_trait::async_trait;
use foodme_core::{Candidate, ListingsProvider, ProviderError, SearchFilters};
use reqwest::{Client, Url};

use crate::error::ListingsError;
use crate::normalize::normalize_business;
use crate::types::{ErrorResponse, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.yelp.com/v3/";
const SEARCH_PATH: &str = "businesses/search";

/// Client for the listings REST API.
///
/// Use [`ListingsClient::new`] for production or
/// [`ListingsClient::with_base_url`] to point at a mock server in tests.
pub struct ListingsClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl ListingsClient {
    /// Creates a client pointed at the production listings API.
    ///
    /// # Errors
    ///
    /// Returns [`ListingsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ListingsError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ListingsError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`ListingsError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ListingsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ListingsError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.map(ToOwned::to_owned),
            base_url,
        })
    }

    /// Searches around a free-text place such as `"montreal"`.
    ///
    /// # Errors
    ///
    /// - [`ListingsError::Http`] on network failure.
    /// - [`ListingsError::Api`] on a non-2xx status.
    /// - [`ListingsError::Deserialize`] if the body does not match.
    pub async fn search_location(
        &self,
        location: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ListingsError> {
        let url = self.build_search_url(&[("location", location.to_owned())], filters)?;
        self.search(&url).await
    }

    /// Searches around a longitude/latitude pair.
    ///
    /// # Errors
    ///
    /// Same as [`ListingsClient::search_location`].
    pub async fn search_coordinates(
        &self,
        longitude: f64,
        latitude: f64,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ListingsError> {
        let url = self.build_search_url(
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
            ],
            filters,
        )?;
        self.search(&url).await
    }

    /// Builds the search URL with percent-encoded query parameters.
    fn build_search_url(
        &self,
        location: &[(&str, String)],
        filters: &SearchFilters,
    ) -> Result<Url, ListingsError> {
        let mut url =
            self.base_url
                .join(SEARCH_PATH)
                .map_err(|e| ListingsError::InvalidBaseUrl {
                    url: self.base_url.to_string(),
                    reason: e.to_string(),
                })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in location {
                pairs.append_pair(k, v);
            }
            if let Some(radius) = filters.radius_m {
                pairs.append_pair("radius", &radius.to_string());
            }
            if let Some(price) = filters.price {
                pairs.append_pair("price", &price.to_string());
            }
            if let Some(cuisine) = &filters.cuisine {
                pairs.append_pair("categories", &cuisine.trim().to_lowercase());
            }
            pairs.append_pair("sort_by", filters.sort_by.as_str());
            pairs.append_pair(
                "limit",
                &filters.limit.clamp(1, SearchFilters::MAX_LIMIT).to_string(),
            );
        }
        Ok(url)
    }

    async fn search(&self, url: &Url) -> Result<Vec<Candidate>, ListingsError> {
        tracing::debug!(url = %url, "listings search");

        let mut request = self.client.get(url.clone());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ListingsError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ListingsError::Deserialize {
                context: SEARCH_PATH.to_owned(),
                source: e,
            })?;

        let returned = parsed.businesses.len();
        let candidates: Vec<Candidate> = parsed
            .businesses
            .into_iter()
            .filter_map(normalize_business)
            .collect();

        if candidates.len() < returned {
            tracing::warn!(
                dropped = returned - candidates.len(),
                "listings rows without a usable distance were dropped"
            );
        }

        Ok(candidates)
    }
}

/// Pulls the human-readable description out of an error body, falling back
/// to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.description.or(e.error.code))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn to_provider_error(err: ListingsError) -> ProviderError {
    match err {
        ListingsError::Deserialize { .. } => ProviderError::InvalidResponse(err.to_string()),
        other => ProviderError::Request(other.to_string()),
    }
}

#[async_trait]
impl ListingsProvider for ListingsClient {
    async fn find_by_location(
        &self,
        location: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.search_location(location, filters)
            .await
            .map_err(to_provider_error)
    }

    async fn find_by_coordinates(
        &self,
        longitude: f64,
        latitude: f64,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.search_coordinates(longitude, latitude, filters)
            .await
            .map_err(to_provider_error)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
