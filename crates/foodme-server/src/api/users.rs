use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use foodme_core::{
    password::{generate_random_password, hash_password, verify_password},
    AppUser, NewUser,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_directory_error, not_found, validation_error, ApiError, ApiResponse, AppState};

const MIN_PASSWORD_LEN: usize = 8;
const RESET_PASSWORD_LEN: usize = 16;

#[derive(Debug, Serialize)]
pub(super) struct UserItem {
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    default_preference_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<AppUser> for UserItem {
    fn from(user: AppUser) -> Self {
        Self {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            default_preference_id: user.default_preference_id,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginResponse {
    token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PasswordResetResponse {
    password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PasswordChanged {
    updated: bool,
}

fn validate_password(request_id: &str, password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(validation_error(
            request_id,
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

fn validate_new_user(request_id: &str, body: &CreateUserRequest) -> Result<(), ApiError> {
    let required = [
        ("username", &body.username),
        ("first_name", &body.first_name),
        ("last_name", &body.last_name),
        ("email", &body.email),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(validation_error(request_id, format!("{field} is required")));
    }
    if !body.email.contains('@') {
        return Err(validation_error(request_id, "email must contain '@'"));
    }
    validate_password(request_id, &body.password)
}

pub(super) async fn create_user(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserItem>>), ApiError> {
    validate_new_user(&req_id.0, &body)?;

    let new_user = NewUser {
        username: body.username.trim().to_owned(),
        first_name: body.first_name.trim().to_owned(),
        last_name: body.last_name.trim().to_owned(),
        email: body.email.trim().to_owned(),
        password_hash: hash_password(&body.password),
    };
    let user = state
        .directory
        .create_user(&new_user)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    tracing::info!(username = %user.username, "account created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::new(UserItem::from(user), req_id.0),
    ))
}

pub(super) async fn get_user(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<UserItem>>, ApiError> {
    let user = state
        .directory
        .get_user(&username)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?
        .ok_or_else(|| not_found(&req_id.0, format!("user '{username}'")))?;

    Ok(ApiResponse::new(UserItem::from(user), req_id.0))
}

pub(super) async fn delete_user(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<UserItem>>, ApiError> {
    let user = state
        .directory
        .delete_user(&username)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?
        .ok_or_else(|| not_found(&req_id.0, format!("user '{username}'")))?;

    tracing::info!(username = %user.username, "account deleted");
    Ok(ApiResponse::new(UserItem::from(user), req_id.0))
}

pub(super) async fn change_password(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<PasswordChanged>>, ApiError> {
    validate_password(&req_id.0, &body.new_password)?;

    let user = state
        .directory
        .get_user(&username)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?
        .ok_or_else(|| not_found(&req_id.0, format!("user '{username}'")))?;

    if !verify_password(&body.old_password, &user.password_hash) {
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "old password is incorrect",
        ));
    }

    state
        .directory
        .set_password_hash(&username, &hash_password(&body.new_password))
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    tracing::info!(%username, "password changed");
    Ok(ApiResponse::new(PasswordChanged { updated: true }, req_id.0))
}

pub(super) async fn reset_password(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<PasswordResetResponse>>, ApiError> {
    let password = generate_random_password(RESET_PASSWORD_LEN);

    state
        .directory
        .set_password_hash(&username, &hash_password(&password))
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    tracing::info!(%username, "password reset");
    Ok(ApiResponse::new(PasswordResetResponse { password }, req_id.0))
}

pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = state
        .directory
        .get_user(body.username.trim())
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    let verified = user
        .as_ref()
        .is_some_and(|u| verify_password(&body.password, &u.password_hash));
    let Some(user) = user.filter(|_| verified) else {
        tracing::info!(username = %body.username, "login rejected");
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "invalid username or password",
        ));
    };

    let token = Uuid::new_v4().to_string();
    state
        .directory
        .create_session(&user.username, &token)
        .await
        .map_err(|e| map_directory_error(req_id.0.clone(), &e))?;

    tracing::info!(username = %user.username, "login succeeded");
    Ok(ApiResponse::new(LoginResponse { token }, req_id.0))
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
