//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::{NamedCount, UserSummary};

/// Event database model
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub type_id: i32,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub location: String,
    pub organizer_id: i64,
    /// Capacity; `None` means unlimited
    pub max_participants: Option<i32>,
    pub faculty_id: Option<i32>,
    pub budget: Option<f64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_date_time <= now
    }

    pub fn summary(&self) -> EventSummary {
        EventSummary {
            id: self.id,
            title: self.title.clone(),
            start_date_time: self.start_date_time,
            end_date_time: self.end_date_time,
            location: self.location.clone(),
            organizer_id: self.organizer_id,
            max_participants: self.max_participants,
        }
    }
}

/// Compact event shape attached to registrations
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub location: String,
    pub organizer_id: i64,
    pub max_participants: Option<i32>,
}

/// Event with its lookups resolved, as returned by `GET /events/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub type_name: Option<String>,
    pub faculty_name: Option<String>,
    pub organizer: Option<UserSummary>,
    pub registrations_count: i64,
}

/// Event listing statistics
#[derive(Debug, Clone, Serialize)]
pub struct EventStatistics {
    pub total_events: i64,
    pub upcoming_events: i64,
    pub past_events: i64,
    pub events_by_type: Vec<NamedCount>,
    pub events_by_faculty: Vec<NamedCount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_has_started_includes_start_instant() {
        let now = Utc::now();
        let event = Event {
            id: 1,
            title: "Hackathon".into(),
            description: None,
            type_id: 1,
            start_date_time: now,
            end_date_time: now + Duration::hours(3),
            location: "Hall A".into(),
            organizer_id: 2,
            max_participants: Some(10),
            faculty_id: None,
            budget: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        assert!(event.has_started(now));
        assert!(!event.has_started(now - Duration::seconds(1)));
        assert_eq!(event.summary().max_participants, Some(10));
    }
}
