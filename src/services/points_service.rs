//! Points and leaderboard

use sqlx::PgPool;

use crate::{
    constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    db::repositories::PointsRepository,
    error::AppResult,
    models::LeaderboardEntry,
};

pub struct PointsService;

impl PointsService {
    /// Top `limit` users by total points (default 20, at most 100)
    pub async fn leaderboard(pool: &PgPool, limit: Option<u32>) -> AppResult<Vec<LeaderboardEntry>> {
        PointsRepository::leaderboard(pool, leaderboard_limit(limit)).await
    }
}

fn leaderboard_limit(limit: Option<u32>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE) as i64
}
