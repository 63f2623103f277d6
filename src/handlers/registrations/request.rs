//! Registration request DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, de::IgnoredAny};

use crate::error::{AppError, AppResult};

/// `POST /event-registrations`
#[derive(Debug, Deserialize)]
pub struct CreateRegistrationRequest {
    pub event_id: i64,
    /// Defaults to the caller; only staff may name someone else
    pub user_id: Option<i64>,
    /// Staff only; defaults to `pending`
    pub status_id: Option<i32>,
    /// Accepted by the parser only so it can be refused; the server stamps the date
    #[serde(default)]
    registration_date: Option<IgnoredAny>,
}

impl CreateRegistrationRequest {
    pub fn check(&self) -> AppResult<()> {
        if self.registration_date.is_some() {
            return Err(AppError::field(
                "registration_date",
                "The registration date is assigned by the server",
            ));
        }
        Ok(())
    }
}

/// `PUT /event-registrations/{id}`
#[derive(Debug, Deserialize)]
pub struct UpdateRegistrationRequest {
    pub status_id: i32,
}

/// `POST /register`
#[derive(Debug, Deserialize)]
pub struct SelfRegistrationRequest {
    pub event_id: i64,
}

/// Query parameters for the registration index
#[derive(Debug, Default, Deserialize)]
pub struct ListRegistrationsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub event_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status_id: Option<i32>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_date_is_refused() {
        let request: CreateRegistrationRequest = serde_json::from_value(serde_json::json!({
            "event_id": 5,
            "registration_date": "2020-01-01T00:00:00Z"
        }))
        .unwrap();

        match request.check() {
            Err(AppError::Validation(errors)) => assert!(errors.contains_key("registration_date")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_request() {
        let request: CreateRegistrationRequest =
            serde_json::from_value(serde_json::json!({ "event_id": 5 })).unwrap();
        assert!(request.check().is_ok());
        assert_eq!(request.user_id, None);
        assert_eq!(request.status_id, None);
    }
}
