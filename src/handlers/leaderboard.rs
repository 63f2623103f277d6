//! Points leaderboard

use axum::{Router, extract::State, routing::get};
use serde::Deserialize;

use crate::{
    error::AppResult,
    handlers::{
        envelope::ApiResponse,
        extract::{Json, Query},
    },
    models::LeaderboardEntry,
    services::PointsService,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<u32>,
}

/// Users ranked by total points
async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<ApiResponse<Vec<LeaderboardEntry>>>> {
    let entries = PointsService::leaderboard(state.db(), query.limit).await?;
    Ok(ApiResponse::data(entries))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(leaderboard))
}
