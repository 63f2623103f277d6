//! Event handler implementations

use axum::{extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    handlers::{
        envelope::ApiResponse,
        extract::{Json, Path, Query},
    },
    middleware::auth::AuthenticatedUser,
    models::{Event, EventDetails, EventRegistrationsView, EventStatistics},
    services::EventService,
    state::AppState,
    utils::Paginated,
};

use super::request::{EventRequest, ListEventsQuery};

/// List events (paginated, filterable)
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Event>>>> {
    let page = EventService::list(state.db(), query).await?;
    Ok(ApiResponse::data(page))
}

/// Get a single event with its type, faculty and organizer
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<EventDetails>>> {
    let event = EventService::get(state.db(), id).await?;
    Ok(ApiResponse::data(event))
}

/// Create a new event
pub async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<EventRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Event>>)> {
    let now = state.registrations().now();
    let event = EventService::create(state.db(), &auth_user.actor(), payload, now).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(event, "Event created successfully"),
    ))
}

/// Update an event
pub async fn update_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<EventRequest>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let now = state.registrations().now();
    let event = EventService::update(state.db(), &auth_user.actor(), id, payload, now).await?;

    Ok(ApiResponse::with_message(event, "Event updated successfully"))
}

/// Delete an event
pub async fn delete_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    EventService::delete(state.db(), &auth_user.actor(), id).await?;
    Ok(ApiResponse::message("Event deleted successfully"))
}

/// Event statistics
pub async fn event_statistics(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<EventStatistics>>> {
    let now = state.registrations().now();
    let statistics = EventService::statistics(state.db(), now).await?;
    Ok(ApiResponse::data(statistics))
}

/// Registrations of one event with seat statistics
pub async fn list_event_registrations(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<EventRegistrationsView>>> {
    auth_user.require_staff()?;

    let view = state.registrations().list_event_registrations(id).await?;
    Ok(ApiResponse::data(view))
}
