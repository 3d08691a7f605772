//! Search endpoints. Successful bodies are bare candidate JSON, not the
//! `{data, meta}` envelope, so identical queries yield identical bytes.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use foodme_core::LocationQuery;
use foodme_search::query::{parse_cuisine, parse_location, parse_place, parse_price, parse_radius};
use foodme_search::SearchError;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_search_error, validation_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct DistanceQuery {
    pub radius: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FilterQuery {
    pub location: Option<String>,
    pub longitude: Option<String>,
    pub latitude: Option<String>,
    pub price: Option<String>,
    pub cuisine: Option<String>,
}

impl FilterQuery {
    fn location_form(&self) -> Result<LocationQuery, SearchError> {
        parse_location(
            self.location.as_deref(),
            self.longitude.as_deref(),
            self.latitude.as_deref(),
        )
    }

    /// The place named by `?location=`; coordinates are rejected.
    fn place(&self) -> Result<LocationQuery, SearchError> {
        match self.location_form()? {
            place @ LocationQuery::Place(_) => Ok(place),
            LocationQuery::Coordinates { .. } => Err(SearchError::InvalidQuery(
                "location is required; use the longitude/latitude route for coordinates"
                    .to_owned(),
            )),
        }
    }

    /// The `?longitude=&latitude=` pair; a place name is rejected.
    fn coordinates(&self) -> Result<LocationQuery, SearchError> {
        match self.location_form()? {
            coordinates @ LocationQuery::Coordinates { .. } => Ok(coordinates),
            LocationQuery::Place(_) => Err(SearchError::InvalidQuery(
                "longitude and latitude are required; use the location route for places"
                    .to_owned(),
            )),
        }
    }
}

/// `GET /search/{location}/distance/{page}/`
///
/// Page `0` is the distance-ordered list, page `1` a single random pick.
pub(super) async fn search_by_distance(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((location, page)): Path<(String, String)>,
    Query(query): Query<DistanceQuery>,
) -> Result<Response, ApiError> {
    let search_error = |e: SearchError| map_search_error(req_id.0.clone(), &e);
    let location = parse_place(Some(location.as_str())).map_err(search_error)?;
    let radius = parse_radius(query.radius.as_deref()).map_err(search_error)?;

    match page.trim() {
        "0" => {
            let candidates = state
                .search
                .search_by_distance(&location, radius)
                .await
                .map_err(search_error)?;
            Ok(Json(candidates).into_response())
        }
        "1" => {
            let candidate = state
                .search
                .recommend_random(&location, radius)
                .await
                .map_err(search_error)?;
            Ok(Json(candidate).into_response())
        }
        other => Err(validation_error(
            &req_id.0,
            format!("page must be 0 (sorted list) or 1 (random pick), got '{other}'"),
        )),
    }
}

/// `GET /search/price/?location=&price=`
pub(super) async fn search_by_price(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let search_error = |e: SearchError| map_search_error(req_id.0.clone(), &e);
    let location = query.place().map_err(search_error)?;
    let price = parse_price(query.price.as_deref()).map_err(search_error)?;

    let candidates = state
        .search
        .search_by_price(&location, price)
        .await
        .map_err(search_error)?;
    Ok(Json(candidates).into_response())
}

/// `GET /search/price/longitude/latitude/?longitude=&latitude=&price=`
pub(super) async fn search_by_price_coordinates(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let search_error = |e: SearchError| map_search_error(req_id.0.clone(), &e);
    let location = query.coordinates().map_err(search_error)?;
    let price = parse_price(query.price.as_deref()).map_err(search_error)?;

    let candidates = state
        .search
        .search_by_price(&location, price)
        .await
        .map_err(search_error)?;
    Ok(Json(candidates).into_response())
}

/// `GET /search/cuisine/?location=&cuisine=`
pub(super) async fn search_by_cuisine(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let search_error = |e: SearchError| map_search_error(req_id.0.clone(), &e);
    let location = query.place().map_err(search_error)?;
    let cuisine = parse_cuisine(query.cuisine.as_deref()).map_err(search_error)?;

    let candidates = state
        .search
        .search_by_cuisine(&location, &cuisine)
        .await
        .map_err(search_error)?;
    Ok(Json(candidates).into_response())
}

/// `GET /search/cuisine/longitude/latitude/?longitude=&latitude=&cuisine=`
pub(super) async fn search_by_cuisine_coordinates(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let search_error = |e: SearchError| map_search_error(req_id.0.clone(), &e);
    let location = query.coordinates().map_err(search_error)?;
    let cuisine = parse_cuisine(query.cuisine.as_deref()).map_err(search_error)?;

    let candidates = state
        .search
        .search_by_cuisine(&location, &cuisine)
        .await
        .map_err(search_error)?;
    Ok(Json(candidates).into_response())
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
