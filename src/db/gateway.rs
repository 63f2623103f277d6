//! Persistence gateway consumed by the registration engine
//!
//! The engine never issues queries itself; everything it reads or writes goes
//! through [`RegistrationGateway`], so storage can be swapped (Postgres in
//! production, [`InMemoryGateway`](super::memory::InMemoryGateway) in tests).

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    Event, EventRegistration, NewRegistration, RegistrationDetails, RegistrationStatus,
    RegistrationWithRelations, StatusName, User,
};

/// Typed storage operations for registrations and the rows they reference.
///
/// Lookups return `Ok(None)` when the row does not exist. Storage failures
/// come back as `AppError::Database` and are never retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationGateway: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>>;

    async fn find_event_by_id(&self, id: i64) -> AppResult<Option<Event>>;

    async fn find_registration_by_id(&self, id: i64) -> AppResult<Option<RegistrationWithRelations>>;

    async fn find_registration_by_event_and_user(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> AppResult<Option<EventRegistration>>;

    /// Registrations on `event_id` whose status name is one of `statuses`
    async fn count_registrations_by_event_and_status_names(
        &self,
        event_id: i64,
        statuses: &[StatusName],
    ) -> AppResult<i64>;

    async fn find_status_by_name(&self, name: StatusName) -> AppResult<Option<RegistrationStatus>>;

    async fn find_status_by_id(&self, id: i32) -> AppResult<Option<RegistrationStatus>>;

    /// Conditional insert.
    ///
    /// Re-checks, atomically with the write, that no row pairs the event and
    /// user (`DuplicateRegistration`) and that the event still has a free seat
    /// (`CapacityExceeded`). `NotFound` if the event vanished meanwhile.
    async fn insert_registration(&self, new: NewRegistration) -> AppResult<RegistrationWithRelations>;

    /// Returns `false` when nothing was deleted
    async fn delete_registration(&self, id: i64) -> AppResult<bool>;

    async fn update_registration_status(
        &self,
        id: i64,
        status_id: i32,
    ) -> AppResult<Option<RegistrationWithRelations>>;

    /// Oldest first
    async fn list_registrations_for_event(&self, event_id: i64) -> AppResult<Vec<RegistrationWithRelations>>;

    /// Newest first
    async fn list_registrations_for_user(&self, user_id: i64) -> AppResult<Vec<RegistrationWithRelations>>;

    async fn find_registration_details(&self, id: i64) -> AppResult<Option<RegistrationDetails>>;
}
