//! Authentication handler implementations

use axum::{extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    db::repositories::UserRepository,
    error::{AppError, AppResult},
    handlers::{envelope::ApiResponse, extract::Json},
    middleware::auth::AuthenticatedUser,
    models::User,
    services::AuthService,
    state::AppState,
};

use super::{
    request::{ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest},
    response::AuthResponse,
};

/// Register a new student account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    payload.check()?;

    let response = AuthService::register(state.db(), &state.config().jwt, payload).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(response, "User registered successfully"),
    ))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    payload.validate()?;

    let response = AuthService::login(state.db(), &state.config().jwt, payload).await?;
    Ok(ApiResponse::with_message(response, "Login successful"))
}

/// Revoke the presented token
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<()>>> {
    AuthService::logout(state.redis(), &auth_user.claims).await?;
    Ok(ApiResponse::message("Successfully logged out"))
}

/// Revoke every token of the caller
pub async fn logout_all(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<()>>> {
    AuthService::logout_all(state.redis(), &state.config().jwt, auth_user.id).await?;
    Ok(ApiResponse::message("Successfully logged out from all devices"))
}

/// Get the caller's profile
pub async fn profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = UserRepository::find_by_id(state.db(), auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::data(user))
}

/// Update the caller's profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;

    let user = AuthService::update_profile(state.db(), auth_user.id, payload).await?;
    Ok(ApiResponse::with_message(user, "Profile updated successfully"))
}

/// Change the caller's password
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    payload.check()?;

    AuthService::change_password(state.db(), auth_user.id, payload).await?;
    Ok(ApiResponse::message("Password changed successfully"))
}
