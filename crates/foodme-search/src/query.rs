//! Parsing of raw request parameters into search inputs.
//!
//! Every helper treats `None` and blank strings alike: both are "missing".

use foodme_core::{LocationQuery, PriceTier, SearchFilters};

use crate::SearchError;

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// A required free-text place.
///
/// # Errors
///
/// [`SearchError::InvalidQuery`] if `location` is missing or blank.
pub fn parse_place(location: Option<&str>) -> Result<LocationQuery, SearchError> {
    present(location)
        .map(|place| LocationQuery::Place(place.to_owned()))
        .ok_or_else(|| SearchError::InvalidQuery("location is required".to_owned()))
}

/// A required longitude/latitude pair.
///
/// # Errors
///
/// [`SearchError::InvalidQuery`] if either coordinate is missing, not a
/// finite number, or out of range.
pub fn parse_coordinates(
    longitude: Option<&str>,
    latitude: Option<&str>,
) -> Result<LocationQuery, SearchError> {
    let longitude = parse_coordinate("longitude", longitude, 180.0)?;
    let latitude = parse_coordinate("latitude", latitude, 90.0)?;
    Ok(LocationQuery::Coordinates {
        longitude,
        latitude,
    })
}

/// Exactly one of a place or a coordinate pair.
///
/// # Errors
///
/// [`SearchError::InvalidQuery`] if both forms, neither form, or half a
/// coordinate pair is given.
pub fn parse_location(
    location: Option<&str>,
    longitude: Option<&str>,
    latitude: Option<&str>,
) -> Result<LocationQuery, SearchError> {
    let has_place = present(location).is_some();
    let has_coordinates = present(longitude).is_some() || present(latitude).is_some();

    match (has_place, has_coordinates) {
        (true, true) => Err(SearchError::InvalidQuery(
            "give either location or longitude/latitude, not both".to_owned(),
        )),
        (true, false) => parse_place(location),
        (false, true) => parse_coordinates(longitude, latitude),
        (false, false) => Err(SearchError::InvalidQuery(
            "location or longitude/latitude is required".to_owned(),
        )),
    }
}

/// A required price tier, `1`-`4` or `$`-`$$$$`.
///
/// # Errors
///
/// [`SearchError::InvalidQuery`] if missing or unparseable.
pub fn parse_price(price: Option<&str>) -> Result<PriceTier, SearchError> {
    let raw =
        present(price).ok_or_else(|| SearchError::InvalidQuery("price is required".to_owned()))?;
    raw.parse::<PriceTier>()
        .map_err(|e| SearchError::InvalidQuery(e.to_string()))
}

/// A required cuisine name.
///
/// # Errors
///
/// [`SearchError::InvalidQuery`] if missing or blank.
pub fn parse_cuisine(cuisine: Option<&str>) -> Result<String, SearchError> {
    present(cuisine)
        .map(ToOwned::to_owned)
        .ok_or_else(|| SearchError::InvalidQuery("cuisine is required".to_owned()))
}

/// An optional search radius in meters.
///
/// # Errors
///
/// [`SearchError::InvalidQuery`] if present but not an integer in
/// `1..=40000`.
pub fn parse_radius(radius: Option<&str>) -> Result<Option<u32>, SearchError> {
    let Some(raw) = present(radius) else {
        return Ok(None);
    };
    let invalid = || {
        SearchError::InvalidQuery(format!(
            "radius must be between 1 and {} meters, got '{raw}'",
            SearchFilters::MAX_RADIUS_M
        ))
    };
    let meters = raw.parse::<u32>().map_err(|_| invalid())?;
    if (1..=SearchFilters::MAX_RADIUS_M).contains(&meters) {
        Ok(Some(meters))
    } else {
        Err(invalid())
    }
}

fn parse_coordinate(name: &str, raw: Option<&str>, bound: f64) -> Result<f64, SearchError> {
    let raw =
        present(raw).ok_or_else(|| SearchError::InvalidQuery(format!("{name} is required")))?;
    let value = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= bound)
        .ok_or_else(|| {
            SearchError::InvalidQuery(format!(
                "{name} must be a number between -{bound} and {bound}, got '{raw}'"
            ))
        })?;
    Ok(value)
}
