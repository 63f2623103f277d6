//! User management handler implementations

use axum::{extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    handlers::{
        auth::request::ChangePasswordRequest,
        envelope::ApiResponse,
        extract::{Json, Path, Query},
    },
    middleware::auth::AuthenticatedUser,
    models::{User, UserRegistrationsView, UserStatistics},
    services::{
        UserService,
        user_service::{RemovalOutcome, can_view},
    },
    state::AppState,
    utils::Paginated,
};

use super::{
    request::{CreateUserRequest, ListUsersQuery, UpdateUserRequest},
    response::UserProfileResponse,
};

fn ensure_can_view(auth_user: &AuthenticatedUser, id: i64) -> AppResult<()> {
    if can_view(&auth_user.actor(), id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Cannot view other users".to_string()))
    }
}

/// List users (staff only)
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<ApiResponse<Paginated<User>>>> {
    auth_user.require_staff()?;

    let page = UserService::list(state.db(), query).await?;
    Ok(ApiResponse::data(page))
}

/// Create a user with any role (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    auth_user.require_admin()?;
    payload.check()?;

    let user = UserService::create(state.db(), payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(user, "User created successfully"),
    ))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<User>>> {
    ensure_can_view(&auth_user, id)?;

    let user = UserService::get(state.db(), id).await?;
    Ok(ApiResponse::data(user))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;

    let user = UserService::update(state.db(), &auth_user.actor(), id, payload).await?;
    Ok(ApiResponse::with_message(user, "User updated successfully"))
}

/// Delete or deactivate a user (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    auth_user.require_admin()?;

    let message = match UserService::remove(state.db(), &auth_user.actor(), id).await? {
        RemovalOutcome::Deactivated => "User deactivated (has related records)",
        RemovalOutcome::Deleted => "User deleted successfully",
    };
    Ok(ApiResponse::message(message))
}

/// User statistics (staff only)
pub async fn user_statistics(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<UserStatistics>>> {
    auth_user.require_staff()?;

    let statistics = UserService::statistics(state.db()).await?;
    Ok(ApiResponse::data(statistics))
}

/// Profile with activity statistics
pub async fn user_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<UserProfileResponse>>> {
    ensure_can_view(&auth_user, id)?;

    let profile = UserService::profile(state.db(), id).await?;
    Ok(ApiResponse::data(profile))
}

/// Change or reset a user's password
pub async fn update_password(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    UserService::set_password(state.db(), &auth_user.actor(), id, payload).await?;
    Ok(ApiResponse::message("Password updated successfully"))
}

/// Registrations of one user with upcoming/past counts
pub async fn list_user_registrations(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<UserRegistrationsView>>> {
    ensure_can_view(&auth_user, id)?;

    let view = state.registrations().list_user_registrations(id).await?;
    Ok(ApiResponse::data(view))
}
