//! Event request DTOs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::constants::MAX_NAME_LENGTH;
use crate::error::{AppError, AppResult, field_errors};

/// Create or fully replace an event
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EventRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,

    pub type_id: i32,

    pub start_date_time: DateTime<Utc>,

    pub end_date_time: DateTime<Utc>,

    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Location is required"))]
    pub location: String,

    #[validate(range(min = 1, message = "Maximum participants must be at least 1"))]
    pub max_participants: Option<i32>,

    pub faculty_id: Option<i32>,

    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget: Option<f64>,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    /// Only honoured for admins; organizers always own what they create
    pub organizer_id: Option<i64>,
}

impl EventRequest {
    /// Field validation plus the schedule rules relative to `now`
    pub fn check(&self, now: DateTime<Utc>) -> AppResult<()> {
        let mut errors = match self.validate() {
            Ok(()) => Default::default(),
            Err(e) => field_errors(&e),
        };

        if self.start_date_time <= now {
            errors
                .entry("start_date_time".to_string())
                .or_default()
                .push("The start date must be in the future".to_string());
        }
        if self.end_date_time <= self.start_date_time {
            errors
                .entry("end_date_time".to_string())
                .or_default()
                .push("The end date must be after the start date".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

/// Query parameters for the event index
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub type_id: Option<i32>,
    pub faculty_id: Option<i32>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(now: DateTime<Utc>) -> EventRequest {
        EventRequest {
            title: "Spring Hackathon".into(),
            description: Some("48 hours of code".into()),
            type_id: 1,
            start_date_time: now + Duration::days(3),
            end_date_time: now + Duration::days(5),
            location: "Main hall".into(),
            max_participants: Some(50),
            faculty_id: Some(1),
            budget: Some(15000.0),
            image_url: Some("https://college.edu/hackathon.png".into()),
            organizer_id: None,
        }
    }

    fn errors_of(result: AppResult<()>) -> crate::error::FieldErrors {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_event_request() {
        let now = Utc::now();
        assert!(request(now).check(now).is_ok());
    }

    #[test]
    fn test_schedule_rules() {
        let now = Utc::now();
        let mut req = request(now);
        req.start_date_time = now - Duration::hours(1);
        req.end_date_time = now - Duration::hours(2);

        let errors = errors_of(req.check(now));
        assert!(errors.contains_key("start_date_time"));
        assert!(errors.contains_key("end_date_time"));
    }

    #[test]
    fn test_field_rules_combine_with_schedule_rules() {
        let now = Utc::now();
        let mut req = request(now);
        req.title = String::new();
        req.max_participants = Some(0);
        req.budget = Some(-1.0);
        req.image_url = Some("not a url".into());
        req.end_date_time = req.start_date_time;

        let errors = errors_of(req.check(now));
        for field in ["title", "max_participants", "budget", "image_url", "end_date_time"] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
        assert!(!errors.contains_key("start_date_time"));
    }

    #[test]
    fn test_unlimited_event_is_valid() {
        let now = Utc::now();
        let mut req = request(now);
        req.max_participants = None;
        req.budget = None;
        req.image_url = None;
        assert!(req.check(now).is_ok());
    }
}
