//! Points repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::LeaderboardEntry,
};

/// Repository for user points and the leaderboard
pub struct PointsRepository;

impl PointsRepository {
    /// Sum of a user's points (0 when none)
    pub async fn total_for_user(pool: &PgPool, user_id: i64) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(points), 0)::bigint FROM user_points WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(total)
    }

    /// Active users ranked by summed points; ties broken by user id
    pub async fn leaderboard(pool: &PgPool, limit: i64) -> AppResult<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT
                ROW_NUMBER() OVER (ORDER BY SUM(p.points) DESC, u.id) AS rank,
                u.id AS user_id,
                u.first_name,
                u.last_name,
                u.group_id,
                SUM(p.points)::bigint AS total_points
            FROM user_points p
            JOIN users u ON u.id = p.user_id
            WHERE u.is_active
            GROUP BY u.id, u.first_name, u.last_name, u.group_id
            ORDER BY total_points DESC, u.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }
}
