//! Registration engine
//!
//! Enforces the registration rules: one registration per event and user,
//! capacity while a seat is held by a `pending` or `confirmed` registration,
//! no registration once an event has started and no cancellation inside the
//! cutoff window before it starts. All reads and writes go through the
//! [`RegistrationGateway`]; the current time comes from the injected [`Clock`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    constants::{DEFAULT_CANCELLATION_CUTOFF_MINUTES, roles},
    db::gateway::RegistrationGateway,
    error::{AppError, AppResult},
    models::{
        EventRegistrationStats, EventRegistrationsView, NewRegistration, RegistrationDetails,
        RegistrationStatus, RegistrationWithRelations, StatusName, UserRegistrationStats,
        UserRegistrationsView, UserSummary,
    },
    utils::Clock,
};

/// The authenticated user on whose behalf an operation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub role: String,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == roles::ADMIN
    }

    pub fn is_staff(&self) -> bool {
        roles::STAFF.contains(&self.role.as_str())
    }
}

/// Input of [`RegistrationEngine::create_registration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateRegistration {
    pub event_id: i64,
    pub user_id: i64,
    /// Defaults to the `pending` status
    pub status_id: Option<i32>,
}

/// Registration lifecycle operations
#[derive(Clone)]
pub struct RegistrationEngine {
    gateway: Arc<dyn RegistrationGateway>,
    clock: Arc<dyn Clock>,
    cancellation_cutoff: Duration,
}

impl RegistrationEngine {
    pub fn new(gateway: Arc<dyn RegistrationGateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            clock,
            cancellation_cutoff: Duration::minutes(DEFAULT_CANCELLATION_CUTOFF_MINUTES),
        }
    }

    /// Override how long before the start cancellation closes
    pub fn with_cancellation_cutoff(mut self, cutoff: Duration) -> Self {
        self.cancellation_cutoff = cutoff;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Register a user for an event.
    ///
    /// Checks run in this order: duplicate, event exists, user exists, event
    /// not started, capacity, requested status. The gateway repeats the
    /// duplicate and capacity checks atomically with the insert, so a request
    /// that loses a race still fails with the matching rule error.
    pub async fn create_registration(&self, input: CreateRegistration) -> AppResult<RegistrationWithRelations> {
        let CreateRegistration {
            event_id,
            user_id,
            status_id,
        } = input;

        if self
            .gateway
            .find_registration_by_event_and_user(event_id, user_id)
            .await?
            .is_some()
        {
            tracing::info!(event_id, user_id, "Registration rejected: duplicate");
            return Err(AppError::DuplicateRegistration);
        }

        let event = self
            .gateway
            .find_event_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        self.gateway
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = self.clock.now();
        if event.has_started(now) {
            tracing::info!(event_id, user_id, "Registration rejected: event already started");
            return Err(AppError::EventAlreadyStarted);
        }

        if let Some(max) = event.max_participants {
            let taken = self
                .gateway
                .count_registrations_by_event_and_status_names(event_id, StatusName::CAPACITY_HOLDING)
                .await?;
            if taken >= i64::from(max) {
                tracing::info!(event_id, user_id, taken, max, "Registration rejected: capacity exceeded");
                return Err(AppError::CapacityExceeded);
            }
        }

        let status = match status_id {
            Some(id) => self.resolve_status_id(id).await?,
            None => self.resolve_status_name(StatusName::Pending).await?,
        };

        let created = self
            .gateway
            .insert_registration(NewRegistration {
                event_id,
                user_id,
                status_id: status.id,
                registration_date: now,
            })
            .await?;

        tracing::info!(
            registration_id = created.registration.id,
            event_id,
            user_id,
            status = %status.name,
            "Registration created"
        );

        Ok(created)
    }

    /// Remove a registration.
    ///
    /// When `actor` is given it must own the registration, organize the event
    /// or be an admin. Fails with `TooLateToCancel` once the event starts
    /// within the cancellation cutoff.
    pub async fn cancel_registration(&self, registration_id: i64, actor: Option<&Actor>) -> AppResult<()> {
        let registration = self
            .gateway
            .find_registration_by_id(registration_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        if let Some(actor) = actor {
            let allowed = actor.user_id == registration.user.id
                || actor.user_id == registration.event.organizer_id
                || actor.is_admin();
            if !allowed {
                return Err(AppError::Forbidden(
                    "You can only cancel your own registrations".to_string(),
                ));
            }
        }

        let now = self.clock.now();
        if registration.event.start_date_time <= now + self.cancellation_cutoff {
            tracing::info!(registration_id, "Cancellation rejected: inside cutoff window");
            return Err(AppError::TooLateToCancel);
        }

        if !self.gateway.delete_registration(registration_id).await? {
            return Err(AppError::NotFound("Registration not found".to_string()));
        }

        tracing::info!(
            registration_id,
            event_id = registration.event.id,
            user_id = registration.user.id,
            "Registration cancelled"
        );

        Ok(())
    }

    /// Set any status on a registration; there is no transition graph
    pub async fn update_registration_status(
        &self,
        registration_id: i64,
        status_id: i32,
    ) -> AppResult<RegistrationWithRelations> {
        let status = self.resolve_status_id(status_id).await?;

        let updated = self
            .gateway
            .update_registration_status(registration_id, status.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        tracing::info!(registration_id, status = %status.name, "Registration status updated");

        Ok(updated)
    }

    /// Registrations of an event, oldest first, with seat statistics
    pub async fn list_event_registrations(&self, event_id: i64) -> AppResult<EventRegistrationsView> {
        let event = self
            .gateway
            .find_event_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let registrations = self.gateway.list_registrations_for_event(event_id).await?;
        let statistics = event_statistics(event.max_participants, &registrations);

        Ok(EventRegistrationsView {
            event,
            registrations,
            statistics,
        })
    }

    /// Registrations of a user, newest first, with upcoming/past counts
    pub async fn list_user_registrations(&self, user_id: i64) -> AppResult<UserRegistrationsView> {
        let user = self
            .gateway
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let registrations = self.gateway.list_registrations_for_user(user_id).await?;
        let statistics = user_statistics(self.clock.now(), &registrations);

        Ok(UserRegistrationsView {
            user: UserSummary::from(&user),
            registrations,
            statistics,
        })
    }

    /// Registration with event, user, status, attendance and feedback
    pub async fn get_registration(&self, registration_id: i64) -> AppResult<RegistrationDetails> {
        self.gateway
            .find_registration_details(registration_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))
    }

    async fn resolve_status_id(&self, status_id: i32) -> AppResult<RegistrationStatus> {
        self.gateway
            .find_status_by_id(status_id)
            .await?
            .ok_or_else(|| AppError::field("status_id", "The selected status_id is invalid"))
    }

    async fn resolve_status_name(&self, name: StatusName) -> AppResult<RegistrationStatus> {
        self.gateway.find_status_by_name(name).await?.ok_or_else(|| {
            AppError::Configuration(format!("registration status '{name}' is not seeded"))
        })
    }
}

#[derive(Default)]
struct StatusCounts {
    confirmed: i64,
    pending: i64,
    cancelled: i64,
}

fn count_statuses(registrations: &[RegistrationWithRelations]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for registration in registrations {
        match registration.status_name() {
            Some(StatusName::Confirmed) => counts.confirmed += 1,
            Some(StatusName::Pending) => counts.pending += 1,
            Some(StatusName::Cancelled) => counts.cancelled += 1,
            _ => {}
        }
    }
    counts
}

/// `available_spots` is `max - (pending + confirmed)` floored at 0, `None` when uncapped
pub fn event_statistics(
    max_participants: Option<i32>,
    registrations: &[RegistrationWithRelations],
) -> EventRegistrationStats {
    let counts = count_statuses(registrations);
    let holding = registrations
        .iter()
        .filter(|r| r.status_name().is_some_and(|s| s.holds_capacity()))
        .count() as i64;
    let available_spots = max_participants.map(|max| (i64::from(max) - holding).max(0));

    EventRegistrationStats {
        total_registrations: registrations.len() as i64,
        confirmed: counts.confirmed,
        pending: counts.pending,
        cancelled: counts.cancelled,
        available_spots,
    }
}

/// Upcoming: event starts after `now`. Past: event ended before `now`.
pub fn user_statistics(now: DateTime<Utc>, registrations: &[RegistrationWithRelations]) -> UserRegistrationStats {
    let counts = count_statuses(registrations);

    UserRegistrationStats {
        total_registrations: registrations.len() as i64,
        confirmed: counts.confirmed,
        pending: counts.pending,
        cancelled: counts.cancelled,
        upcoming_events: registrations
            .iter()
            .filter(|r| r.event.start_date_time > now)
            .count() as i64,
        past_events: registrations
            .iter()
            .filter(|r| r.event.end_date_time < now)
            .count() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::gateway::MockRegistrationGateway;
    use crate::models::{Event, EventRegistration, User};
    use crate::utils::ManualClock;

    fn now() -> DateTime<Utc> {
        "2025-03-01T10:00:00Z".parse().unwrap()
    }

    fn event(max_participants: Option<i32>, starts_in: Duration) -> Event {
        Event {
            id: 10,
            title: "Robotics workshop".into(),
            description: None,
            type_id: 1,
            start_date_time: now() + starts_in,
            end_date_time: now() + starts_in + Duration::hours(2),
            location: "Lab 3".into(),
            organizer_id: 2,
            max_participants,
            faculty_id: None,
            budget: None,
            image_url: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn user(id: i64) -> User {
        User {
            id,
            first_name: "Ivan".into(),
            last_name: "Sidorov".into(),
            email: format!("user{id}@college.edu"),
            phone: None,
            telegram_id: None,
            password_hash: String::new(),
            role_id: 1,
            role_name: roles::STUDENT.into(),
            group_id: None,
            is_active: true,
            last_login_at: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn with_relations(status: &str, starts_in: Duration) -> RegistrationWithRelations {
        let event = event(Some(5), starts_in);
        RegistrationWithRelations {
            registration: EventRegistration {
                id: 1,
                event_id: event.id,
                user_id: 7,
                status_id: 1,
                registration_date: now(),
            },
            event: event.summary(),
            user: UserSummary::from(&user(7)),
            status: RegistrationStatus {
                id: 1,
                name: status.into(),
            },
        }
    }

    fn engine(gateway: MockRegistrationGateway) -> RegistrationEngine {
        RegistrationEngine::new(Arc::new(gateway), Arc::new(ManualClock::new(now())))
    }

    #[tokio::test]
    async fn test_missing_pending_status_is_configuration_error() {
        let mut gateway = MockRegistrationGateway::new();
        gateway
            .expect_find_registration_by_event_and_user()
            .returning(|_, _| Ok(None));
        gateway
            .expect_find_event_by_id()
            .returning(|_| Ok(Some(event(Some(3), Duration::days(1)))));
        gateway.expect_find_user_by_id().returning(|id| Ok(Some(user(id))));
        gateway
            .expect_count_registrations_by_event_and_status_names()
            .returning(|_, _| Ok(0));
        gateway.expect_find_status_by_name().returning(|_| Ok(None));
        gateway.expect_insert_registration().never();

        let err = engine(gateway)
            .create_registration(CreateRegistration {
                event_id: 10,
                user_id: 7,
                status_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_requested_status_is_field_error() {
        let mut gateway = MockRegistrationGateway::new();
        gateway
            .expect_find_registration_by_event_and_user()
            .returning(|_, _| Ok(None));
        gateway
            .expect_find_event_by_id()
            .returning(|_| Ok(Some(event(None, Duration::days(1)))));
        gateway.expect_find_user_by_id().returning(|id| Ok(Some(user(id))));
        gateway.expect_find_status_by_id().returning(|_| Ok(None));
        gateway.expect_insert_registration().never();

        let err = engine(gateway)
            .create_registration(CreateRegistration {
                event_id: 10,
                user_id: 7,
                status_id: Some(99),
            })
            .await
            .unwrap_err();

        match err {
            AppError::Validation(errors) => assert!(errors.contains_key("status_id")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_uncapped_event_skips_capacity_count() {
        let mut gateway = MockRegistrationGateway::new();
        gateway
            .expect_find_registration_by_event_and_user()
            .returning(|_, _| Ok(None));
        gateway
            .expect_find_event_by_id()
            .returning(|_| Ok(Some(event(None, Duration::days(1)))));
        gateway.expect_find_user_by_id().returning(|id| Ok(Some(user(id))));
        gateway
            .expect_count_registrations_by_event_and_status_names()
            .never();
        gateway.expect_find_status_by_name().returning(|name| {
            Ok(Some(RegistrationStatus {
                id: 1,
                name: name.as_str().into(),
            }))
        });
        gateway
            .expect_insert_registration()
            .withf(|new| new.status_id == 1 && new.registration_date == now())
            .times(1)
            .returning(|_| Ok(with_relations("pending", Duration::days(1))));

        let created = engine(gateway)
            .create_registration(CreateRegistration {
                event_id: 10,
                user_id: 7,
                status_id: None,
            })
            .await
            .unwrap();

        assert_eq!(created.status.name, "pending");
    }

    #[tokio::test]
    async fn test_storage_failure_is_propagated_not_retried() {
        let mut gateway = MockRegistrationGateway::new();
        gateway
            .expect_find_registration_by_event_and_user()
            .times(1)
            .returning(|_, _| Err(AppError::Database("connection reset".into())));

        let err = engine(gateway)
            .create_registration(CreateRegistration {
                event_id: 10,
                user_id: 7,
                status_id: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "UNEXPECTED_ERROR");
    }

    #[tokio::test]
    async fn test_stranger_cannot_cancel() {
        let mut gateway = MockRegistrationGateway::new();
        gateway
            .expect_find_registration_by_id()
            .returning(|_| Ok(Some(with_relations("pending", Duration::days(2)))));
        gateway.expect_delete_registration().never();

        let stranger = Actor {
            user_id: 99,
            role: roles::STUDENT.into(),
        };
        let err = engine(gateway)
            .cancel_registration(1, Some(&stranger))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_organizer_and_admin_can_cancel() {
        for actor in [
            Actor {
                user_id: 2,
                role: roles::ORGANIZER.into(),
            },
            Actor {
                user_id: 50,
                role: roles::ADMIN.into(),
            },
        ] {
            let mut gateway = MockRegistrationGateway::new();
            gateway
                .expect_find_registration_by_id()
                .returning(|_| Ok(Some(with_relations("pending", Duration::days(2)))));
            gateway.expect_delete_registration().times(1).returning(|_| Ok(true));

            engine(gateway)
                .cancel_registration(1, Some(&actor))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_custom_cutoff_is_honoured() {
        let mut gateway = MockRegistrationGateway::new();
        gateway
            .expect_find_registration_by_id()
            .returning(|_| Ok(Some(with_relations("pending", Duration::hours(3)))));
        gateway.expect_delete_registration().never();

        let err = engine(gateway)
            .with_cancellation_cutoff(Duration::hours(4))
            .cancel_registration(1, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TooLateToCancel));
    }

    #[test]
    fn test_event_statistics_counts_by_status() {
        let rows = vec![
            with_relations("pending", Duration::days(1)),
            with_relations("confirmed", Duration::days(1)),
            with_relations("cancelled", Duration::days(1)),
            with_relations("attended", Duration::days(1)),
        ];

        let stats = event_statistics(Some(3), &rows);
        assert_eq!(stats.total_registrations, 4);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.available_spots, Some(1));

        assert_eq!(event_statistics(Some(1), &rows).available_spots, Some(0));
        assert_eq!(event_statistics(None, &rows).available_spots, None);
    }

    #[test]
    fn test_user_statistics_splits_upcoming_and_past() {
        let rows = vec![
            with_relations("pending", Duration::days(1)),
            with_relations("confirmed", Duration::days(-3)),
            // started an hour ago, ends in an hour: neither upcoming nor past
            with_relations("confirmed", Duration::hours(-1)),
        ];

        let stats = user_statistics(now(), &rows);
        assert_eq!(stats.total_registrations, 3);
        assert_eq!(stats.upcoming_events, 1);
        assert_eq!(stats.past_events, 1);
        assert_eq!(stats.confirmed, 2);
    }
}
