use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use foodme_core::{Preference, PreferenceInput, PriceTier, SortBy};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_directory_error, not_found, require_user, validation_error, ApiError, ApiResponse, AppState,
};

/// Price as sent by clients: a bare level or its text form (`"2"`, `"$$"`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum PriceField {
    Level(u8),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub(super) struct PreferenceRequest {
    pub price: Option<PriceField>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub cuisine: String,
    pub sort_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct DefaultPreferenceSet {
    username: String,
    default_preference_id: i64,
}

impl PreferenceRequest {
    fn into_input(self, request_id: &str) -> Result<PreferenceInput, ApiError> {
        let price = match self.price {
            None => return Err(validation_error(request_id, "price is required")),
            Some(PriceField::Level(level)) => PriceTier::new(level),
            Some(PriceField::Text(text)) => text.parse::<PriceTier>(),
        }
        .map_err(|e| validation_error(request_id, e.to_string()))?;

        let location = self.location.trim();
        if location.is_empty() {
            return Err(validation_error(request_id, "location is required"));
        }
        let cuisine = self.cuisine.trim();
        if cuisine.is_empty() {
            return Err(validation_error(request_id, "cuisine is required"));
        }

        let sort_by = match self.sort_by.as_deref().map(str::trim) {
            None | Some("") => SortBy::default(),
            Some(raw) => raw
                .parse::<SortBy>()
                .map_err(|e| validation_error(request_id, e.to_string()))?,
        };

        Ok(PreferenceInput {
            price,
            location: location.to_owned(),
            cuisine: cuisine.to_owned(),
            sort_by,
        })
    }
}

pub(super) async fn create_preference(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
    Json(body): Json<PreferenceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Preference>>), ApiError> {
    let input = body.into_input(&req_id.0)?;
    let preference = state
        .directory
        .create_preference(&username, &input)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    tracing::info!(%username, preference_id = preference.id, "preference created");
    Ok((StatusCode::CREATED, ApiResponse::new(preference, req_id.0)))
}

pub(super) async fn list_preferences(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<Preference>>>, ApiError> {
    require_user(&state, &req_id.0, &username).await?;
    let preferences = state
        .directory
        .list_preferences(&username)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(preferences, req_id.0))
}

pub(super) async fn edit_preference(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((username, pid)): Path<(String, i64)>,
    Json(body): Json<PreferenceRequest>,
) -> Result<Json<ApiResponse<Preference>>, ApiError> {
    let input = body.into_input(&req_id.0)?;
    let preference = state
        .directory
        .update_preference(&username, pid, &input)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?
        .ok_or_else(|| not_found(&req_id.0, format!("preference {pid} for user '{username}'")))?;

    Ok(ApiResponse::new(preference, req_id.0))
}

pub(super) async fn delete_preference(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((username, pid)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<Preference>>, ApiError> {
    let preference = state
        .directory
        .delete_preference(&username, pid)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?
        .ok_or_else(|| not_found(&req_id.0, format!("preference {pid} for user '{username}'")))?;

    tracing::info!(%username, preference_id = pid, "preference deleted");
    Ok(ApiResponse::new(preference, req_id.0))
}

pub(super) async fn set_default_preference(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((username, pid)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<DefaultPreferenceSet>>, ApiError> {
    let updated = state
        .directory
        .set_default_preference(&username, pid)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    if !updated {
        return Err(not_found(
            &req_id.0,
            format!("preference {pid} for user '{username}'"),
        ));
    }

    Ok(ApiResponse::new(
        DefaultPreferenceSet {
            username,
            default_preference_id: pid,
        },
        req_id.0,
    ))
}

pub(super) async fn get_default_preference(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Preference>>, ApiError> {
    let preference = state
        .directory
        .get_default_preference(&username)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?
        .ok_or_else(|| not_found(&req_id.0, format!("default preference for user '{username}'")))?;

    Ok(ApiResponse::new(preference, req_id.0))
}
