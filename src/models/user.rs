//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model, joined with its role name
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub telegram_id: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role_id: i32,
    pub role_name: String,
    pub group_id: Option<i32>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact user shape attached to registrations
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Aggregates shown on a user's profile page
#[derive(Debug, Clone, Serialize)]
pub struct UserProfileStats {
    pub organized_events: i64,
    pub participated_events: i64,
    pub total_points: i64,
}

/// User listing statistics
#[derive(Debug, Clone, Serialize)]
pub struct UserStatistics {
    pub total_users: i64,
    pub active_users: i64,
    pub inactive_users: i64,
    pub users_by_role: Vec<NamedCount>,
}

/// `(id, name, count)` bucket used by grouped statistics
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NamedCount {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub count: i64,
}
