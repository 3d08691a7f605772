//! Restaurant records and per-user liked/disliked lists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use foodme_core::{Reaction, Restaurant};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_directory_error, not_found, require_user, validation_error, ApiError, ApiResponse, AppState,
};

const RESTAURANT_FIELDS_MESSAGE: &str =
    "restaurantID and restaurantName must be at least 1 character";

#[derive(Debug, Deserialize)]
pub(super) struct RestaurantRequest {
    #[serde(default, alias = "restaurantID")]
    pub id: String,
    #[serde(default, alias = "restaurantName")]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ReactionRemoved {
    id: String,
    reaction: Reaction,
}

impl RestaurantRequest {
    fn into_restaurant(self, request_id: &str) -> Result<Restaurant, ApiError> {
        let id = self.id.trim();
        let name = self.name.trim();
        if id.is_empty() || name.is_empty() {
            return Err(validation_error(request_id, RESTAURANT_FIELDS_MESSAGE));
        }
        Ok(Restaurant {
            id: id.to_owned(),
            name: name.to_owned(),
        })
    }
}

pub(super) async fn create_restaurant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RestaurantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Restaurant>>), ApiError> {
    let restaurant = body.into_restaurant(&req_id.0)?;
    let created = state
        .directory
        .create_restaurant(&restaurant.id, &restaurant.name)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    Ok((StatusCode::CREATED, ApiResponse::new(created, req_id.0)))
}

async fn add_reaction(
    state: &AppState,
    req_id: RequestId,
    username: &str,
    reaction: Reaction,
    body: RestaurantRequest,
) -> Result<(StatusCode, Json<ApiResponse<Restaurant>>), ApiError> {
    let restaurant = body.into_restaurant(&req_id.0)?;
    let stored = state
        .directory
        .add_reaction(username, reaction, &restaurant)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    tracing::info!(%username, %reaction, restaurant_id = %stored.id, "reaction recorded");
    Ok((StatusCode::CREATED, ApiResponse::new(stored, req_id.0)))
}

async fn list_reactions(
    state: &AppState,
    req_id: RequestId,
    username: &str,
    reaction: Reaction,
) -> Result<Json<ApiResponse<Vec<Restaurant>>>, ApiError> {
    require_user(state, &req_id.0, username).await?;
    let restaurants = state
        .directory
        .list_reactions(username, reaction)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(restaurants, req_id.0))
}

async fn remove_reaction(
    state: &AppState,
    req_id: RequestId,
    username: &str,
    reaction: Reaction,
    restaurant_id: String,
) -> Result<Json<ApiResponse<ReactionRemoved>>, ApiError> {
    let removed = state
        .directory
        .remove_reaction(username, reaction, &restaurant_id)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    if !removed {
        return Err(not_found(
            &req_id.0,
            format!("{reaction} restaurant '{restaurant_id}' for user '{username}'"),
        ));
    }

    Ok(ApiResponse::new(
        ReactionRemoved {
            id: restaurant_id,
            reaction,
        },
        req_id.0,
    ))
}

pub(super) async fn add_liked(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
    Json(body): Json<RestaurantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Restaurant>>), ApiError> {
    add_reaction(&state, req_id, &username, Reaction::Liked, body).await
}

pub(super) async fn add_disliked(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
    Json(body): Json<RestaurantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Restaurant>>), ApiError> {
    add_reaction(&state, req_id, &username, Reaction::Disliked, body).await
}

pub(super) async fn list_liked(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<Restaurant>>>, ApiError> {
    list_reactions(&state, req_id, &username, Reaction::Liked).await
}

pub(super) async fn list_disliked(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<Restaurant>>>, ApiError> {
    list_reactions(&state, req_id, &username, Reaction::Disliked).await
}

pub(super) async fn remove_liked(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((username, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ReactionRemoved>>, ApiError> {
    remove_reaction(&state, req_id, &username, Reaction::Liked, id).await
}

pub(super) async fn remove_disliked(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((username, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ReactionRemoved>>, ApiError> {
    remove_reaction(&state, req_id, &username, Reaction::Disliked, id).await
}
