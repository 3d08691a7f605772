//! Wire types for the `/businesses/search` endpoint.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub businesses: Vec<Business>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    /// Meters from the search point. Absent when the provider could not compute it.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Dollar-sign string such as `"$$"`.
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub coordinates: Option<BusinessCoordinates>,
    #[serde(default)]
    pub location: Option<BusinessLocation>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Category {
    pub alias: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BusinessCoordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct BusinessLocation {
    #[serde(default)]
    pub display_address: Vec<String>,
}

/// Error envelope: `{"error": {"code": "...", "description": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
