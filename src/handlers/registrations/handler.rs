//! Registration handler implementations

use axum::{extract::State, http::StatusCode};

use crate::{
    error::{AppError, AppResult},
    handlers::{
        envelope::ApiResponse,
        extract::{Json, Path, Query},
    },
    middleware::auth::AuthenticatedUser,
    models::{RegistrationDetails, RegistrationWithRelations},
    services::{RegistrationReportService, registration_service::CreateRegistration},
    state::AppState,
    utils::{Paginated, check_in_code},
};

use super::{
    request::{
        CreateRegistrationRequest, ListRegistrationsQuery, SelfRegistrationRequest,
        UpdateRegistrationRequest,
    },
    response::CheckInCodeResponse,
};

/// List registrations (students see only their own)
pub async fn list_registrations(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListRegistrationsQuery>,
) -> AppResult<Json<ApiResponse<Paginated<RegistrationWithRelations>>>> {
    let page = RegistrationReportService::index(state.db(), &auth_user.actor(), query).await?;
    Ok(ApiResponse::data(page))
}

/// Register a user for an event
pub async fn create_registration(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateRegistrationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegistrationWithRelations>>)> {
    payload.check()?;

    let user_id = payload.user_id.unwrap_or(auth_user.id);
    if !auth_user.is_staff() {
        if user_id != auth_user.id {
            return Err(AppError::Forbidden(
                "Students can only register themselves".to_string(),
            ));
        }
        if payload.status_id.is_some() {
            return Err(AppError::Forbidden(
                "Only organizers can set the registration status".to_string(),
            ));
        }
    }

    let registration = state
        .registrations()
        .create_registration(CreateRegistration {
            event_id: payload.event_id,
            user_id,
            status_id: payload.status_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(registration, "Registration created successfully"),
    ))
}

/// Register the caller for an event
pub async fn register_self(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<SelfRegistrationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegistrationWithRelations>>)> {
    let registration = state
        .registrations()
        .create_registration(CreateRegistration {
            event_id: payload.event_id,
            user_id: auth_user.id,
            status_id: None,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(registration, "Successfully registered for the event"),
    ))
}

/// Get a registration with attendance and feedback
pub async fn get_registration(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<RegistrationDetails>>> {
    let details = state.registrations().get_registration(id).await?;
    ensure_owner_or_staff(&auth_user, details.registration.user.id)?;

    Ok(ApiResponse::data(details))
}

/// Change the status of a registration (staff only)
pub async fn update_registration(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRegistrationRequest>,
) -> AppResult<Json<ApiResponse<RegistrationWithRelations>>> {
    auth_user.require_staff()?;

    let registration = state
        .registrations()
        .update_registration_status(id, payload.status_id)
        .await?;

    Ok(ApiResponse::with_message(registration, "Registration updated successfully"))
}

/// Cancel a registration
pub async fn cancel_registration(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let actor = auth_user.actor();
    state.registrations().cancel_registration(id, Some(&actor)).await?;

    Ok(ApiResponse::message("Registration cancelled successfully"))
}

/// Check-in code to be rendered as a QR image by the client
pub async fn generate_check_in_code(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(registration): Path<i64>,
) -> AppResult<Json<ApiResponse<CheckInCodeResponse>>> {
    let details = state.registrations().get_registration(registration).await?;
    ensure_owner_or_staff(&auth_user, details.registration.user.id)?;

    let code = check_in_code(registration, &state.config().jwt.secret);
    Ok(ApiResponse::with_message(
        CheckInCodeResponse {
            registration_id: registration,
            qr_code: code,
        },
        "QR code generated",
    ))
}

fn ensure_owner_or_staff(auth_user: &AuthenticatedUser, owner_id: i64) -> AppResult<()> {
    if auth_user.id == owner_id || auth_user.is_staff() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Cannot access other users' registrations".to_string(),
        ))
    }
}
