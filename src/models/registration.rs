//! Event registration model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::attendance::Attendance;
use super::event::{Event, EventSummary};
use super::feedback::Feedback;
use super::user::UserSummary;

/// Symbolic names of the seeded registration statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusName {
    Pending,
    Confirmed,
    Cancelled,
    Attended,
}

impl StatusName {
    /// Statuses that occupy a seat
    pub const CAPACITY_HOLDING: &'static [StatusName] = &[StatusName::Pending, StatusName::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Attended => "attended",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "attended" => Some(Self::Attended),
            _ => None,
        }
    }

    pub fn holds_capacity(&self) -> bool {
        Self::CAPACITY_HOLDING.contains(self)
    }
}

impl fmt::Display for StatusName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration status row
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct RegistrationStatus {
    pub id: i32,
    pub name: String,
}

impl RegistrationStatus {
    pub fn symbolic(&self) -> Option<StatusName> {
        StatusName::parse(&self.name)
    }
}

/// Event registration database model
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct EventRegistration {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub status_id: i32,
    pub registration_date: DateTime<Utc>,
}

/// Row to insert; the date is always assigned by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub event_id: i64,
    pub user_id: i64,
    pub status_id: i32,
    pub registration_date: DateTime<Utc>,
}

/// Registration with event, user and status attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationWithRelations {
    #[serde(flatten)]
    pub registration: EventRegistration,
    pub event: EventSummary,
    pub user: UserSummary,
    pub status: RegistrationStatus,
}

impl RegistrationWithRelations {
    pub fn status_name(&self) -> Option<StatusName> {
        self.status.symbolic()
    }
}

/// Registration with everything recorded against it
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationDetails {
    #[serde(flatten)]
    pub registration: RegistrationWithRelations,
    pub attendance: Vec<Attendance>,
    pub feedback: Option<Feedback>,
}

/// Per-event registration summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventRegistrationStats {
    pub total_registrations: i64,
    pub confirmed: i64,
    pub pending: i64,
    pub cancelled: i64,
    /// `None` for uncapped events
    pub available_spots: Option<i64>,
}

/// Per-user registration summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserRegistrationStats {
    pub total_registrations: i64,
    pub confirmed: i64,
    pub pending: i64,
    pub cancelled: i64,
    pub upcoming_events: i64,
    pub past_events: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRegistrationsView {
    pub event: Event,
    pub registrations: Vec<RegistrationWithRelations>,
    pub statistics: EventRegistrationStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRegistrationsView {
    pub user: UserSummary,
    pub registrations: Vec<RegistrationWithRelations>,
    pub statistics: UserRegistrationStats,
}
