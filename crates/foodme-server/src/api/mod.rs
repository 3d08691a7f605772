mod preferences;
mod restaurants;
mod search;
mod users;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use foodme_core::{Directory, DirectoryError};
use foodme_search::{SearchError, SearchService};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn Directory>,
    pub search: SearchService,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "provider_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_directory_error(request_id: String, error: &DirectoryError) -> ApiError {
    match error {
        DirectoryError::Conflict(message) => ApiError::new(request_id, "conflict", message.clone()),
        DirectoryError::NotFound(entity) => {
            ApiError::new(request_id, "not_found", format!("{entity} not found"))
        }
        DirectoryError::Storage(_) => {
            tracing::error!(error = %error, "directory request failed");
            ApiError::new(request_id, "internal_error", "storage request failed")
        }
    }
}

pub(super) fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    match error {
        SearchError::InvalidQuery(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        SearchError::NoCandidates => {
            ApiError::new(request_id, "not_found", "no restaurants matched the query")
        }
        SearchError::ProviderUnavailable(_) => {
            tracing::warn!(error = %error, "search failed upstream");
            ApiError::new(
                request_id,
                "provider_unavailable",
                "restaurant listings are unavailable, try again later",
            )
        }
    }
}

/// Shorthand for a 404 naming the missing entity.
pub(super) fn not_found(request_id: &str, what: impl std::fmt::Display) -> ApiError {
    ApiError::new(request_id, "not_found", format!("{what} not found"))
}

/// 404 unless `username` exists, for routes whose empty result would
/// otherwise hide a missing user.
pub(super) async fn require_user(
    state: &AppState,
    request_id: &str,
    username: &str,
) -> Result<(), ApiError> {
    state
        .directory
        .get_user(username)
        .await
        .map_err(|e| map_directory_error(request_id.to_owned(), &e))?
        .map(|_| ())
        .ok_or_else(|| not_found(request_id, format!("user '{username}'")))
}

pub(super) fn validation_error(request_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(request_id, "validation_error", message)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/search/{location}/distance/{page}/",
            get(search::search_by_distance),
        )
        .route("/search/price/", get(search::search_by_price))
        .route(
            "/search/price/longitude/latitude/",
            get(search::search_by_price_coordinates),
        )
        .route("/search/cuisine/", get(search::search_by_cuisine))
        .route(
            "/search/cuisine/longitude/latitude/",
            get(search::search_by_cuisine_coordinates),
        )
        .route("/login", post(users::login))
        .route("/users", post(users::create_user))
        .route(
            "/users/{username}",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/users/{username}/password", put(users::change_password))
        .route(
            "/users/{username}/password/reset",
            post(users::reset_password),
        )
        .route(
            "/users/{username}/preferences",
            get(preferences::list_preferences).post(preferences::create_preference),
        )
        .route(
            "/users/{username}/preferences/default",
            get(preferences::get_default_preference),
        )
        .route(
            "/users/{username}/preferences/{pid}",
            put(preferences::edit_preference).delete(preferences::delete_preference),
        )
        .route(
            "/users/{username}/preferences/{pid}/default",
            put(preferences::set_default_preference),
        )
        .route("/restaurants", post(restaurants::create_restaurant))
        .route(
            "/users/{username}/liked",
            get(restaurants::list_liked).post(restaurants::add_liked),
        )
        .route(
            "/users/{username}/liked/{id}",
            delete(restaurants::remove_liked),
        )
        .route(
            "/users/{username}/disliked",
            get(restaurants::list_disliked).post(restaurants::add_disliked),
        )
        .route(
            "/users/{username}/disliked/{id}",
            delete(restaurants::remove_disliked),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.directory.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}
