//! Lookup data for client forms

use axum::{Router, extract::State, routing::get};

use crate::{
    db::repositories::{ReferenceData, ReferenceRepository},
    error::AppResult,
    handlers::{envelope::ApiResponse, extract::Json},
    state::AppState,
};

/// Roles, faculties, groups, event types and registration statuses
async fn reference_data(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ReferenceData>>> {
    let data = ReferenceRepository::all(state.db()).await?;
    Ok(ApiResponse::data(data))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/reference-data", get(reference_data))
}
