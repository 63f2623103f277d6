//! Leaderboard model

use serde::Serialize;
use sqlx::FromRow;

/// One leaderboard row
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub group_id: Option<i32>,
    pub total_points: i64,
}
