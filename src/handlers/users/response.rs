//! User management response DTOs

use serde::Serialize;

use crate::models::{Event, RegistrationWithRelations, User, UserProfileStats};

/// `GET /users/{id}/profile`
#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub user: User,
    pub statistics: UserProfileStats,
    pub recent_activities: RecentActivities,
}

#[derive(Debug, Serialize)]
pub struct RecentActivities {
    pub events: Vec<Event>,
    pub registrations: Vec<RegistrationWithRelations>,
}
