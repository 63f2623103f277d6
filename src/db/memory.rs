//! In-memory registration gateway
//!
//! All state sits behind one mutex and no lock is held across an await, so
//! the conditional insert is atomic. Used by engine and concurrency tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;

use super::gateway::RegistrationGateway;
use crate::error::{AppError, AppResult};
use crate::models::{
    Attendance, Event, EventRegistration, Feedback, NewRegistration, RegistrationDetails,
    RegistrationStatus, RegistrationWithRelations, StatusName, User, UserSummary,
};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    statuses: BTreeMap<i32, RegistrationStatus>,
    registrations: BTreeMap<i64, EventRegistration>,
    attendance: Vec<Attendance>,
    feedback: Vec<Feedback>,
    next_registration_id: i64,
}

impl State {
    fn status_name(&self, status_id: i32) -> Option<StatusName> {
        self.statuses.get(&status_id).and_then(RegistrationStatus::symbolic)
    }

    fn count_for_event(&self, event_id: i64, statuses: &[StatusName]) -> i64 {
        self.registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .filter(|r| self.status_name(r.status_id).is_some_and(|s| statuses.contains(&s)))
            .count() as i64
    }

    fn with_relations(&self, registration: &EventRegistration) -> AppResult<RegistrationWithRelations> {
        let event = self
            .events
            .get(&registration.event_id)
            .ok_or_else(|| dangling("event", registration.event_id))?;
        let user = self
            .users
            .get(&registration.user_id)
            .ok_or_else(|| dangling("user", registration.user_id))?;
        let status = self
            .statuses
            .get(&registration.status_id)
            .ok_or_else(|| dangling("status", registration.status_id as i64))?;

        Ok(RegistrationWithRelations {
            registration: registration.clone(),
            event: event.summary(),
            user: UserSummary::from(user),
            status: status.clone(),
        })
    }
}

fn dangling(what: &str, id: i64) -> AppError {
    AppError::Database(format!("registration references missing {what} {id}"))
}

/// Registration gateway backed by process memory
#[derive(Debug)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    /// Empty store with the four standard statuses seeded (ids 1..=4)
    pub fn new() -> Self {
        let gateway = Self::without_statuses();
        for (id, name) in [
            (1, StatusName::Pending),
            (2, StatusName::Confirmed),
            (3, StatusName::Cancelled),
            (4, StatusName::Attended),
        ] {
            gateway.add_status(RegistrationStatus {
                id,
                name: name.as_str().to_string(),
            });
        }
        gateway
    }

    /// Empty store without any seed data
    pub fn without_statuses() -> Self {
        Self {
            state: Mutex::new(State {
                next_registration_id: 1,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("in-memory gateway lock poisoned")))
    }

    // Seeding helpers panic on a poisoned lock; they are only called from test setup.

    pub fn add_status(&self, status: RegistrationStatus) {
        self.seed().statuses.insert(status.id, status);
    }

    pub fn add_user(&self, user: User) {
        self.seed().users.insert(user.id, user);
    }

    pub fn add_event(&self, event: Event) {
        self.seed().events.insert(event.id, event);
    }

    pub fn add_attendance(&self, attendance: Attendance) {
        self.seed().attendance.push(attendance);
    }

    pub fn add_feedback(&self, feedback: Feedback) {
        self.seed().feedback.push(feedback);
    }

    /// Number of stored registrations for an event, any status
    pub fn registration_count(&self, event_id: i64) -> usize {
        self.seed()
            .registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .count()
    }

    fn seed(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistrationGateway for InMemoryGateway {
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_event_by_id(&self, id: i64) -> AppResult<Option<Event>> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn find_registration_by_id(&self, id: i64) -> AppResult<Option<RegistrationWithRelations>> {
        let state = self.lock()?;
        state
            .registrations
            .get(&id)
            .map(|r| state.with_relations(r))
            .transpose()
    }

    async fn find_registration_by_event_and_user(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> AppResult<Option<EventRegistration>> {
        Ok(self
            .lock()?
            .registrations
            .values()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
            .cloned())
    }

    async fn count_registrations_by_event_and_status_names(
        &self,
        event_id: i64,
        statuses: &[StatusName],
    ) -> AppResult<i64> {
        Ok(self.lock()?.count_for_event(event_id, statuses))
    }

    async fn find_status_by_name(&self, name: StatusName) -> AppResult<Option<RegistrationStatus>> {
        Ok(self
            .lock()?
            .statuses
            .values()
            .find(|s| s.name == name.as_str())
            .cloned())
    }

    async fn find_status_by_id(&self, id: i32) -> AppResult<Option<RegistrationStatus>> {
        Ok(self.lock()?.statuses.get(&id).cloned())
    }

    async fn insert_registration(&self, new: NewRegistration) -> AppResult<RegistrationWithRelations> {
        let mut state = self.lock()?;

        let max_participants = state
            .events
            .get(&new.event_id)
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?
            .max_participants;

        if state
            .registrations
            .values()
            .any(|r| r.event_id == new.event_id && r.user_id == new.user_id)
        {
            return Err(AppError::DuplicateRegistration);
        }

        if let Some(max) = max_participants {
            if state.count_for_event(new.event_id, StatusName::CAPACITY_HOLDING) >= i64::from(max) {
                return Err(AppError::CapacityExceeded);
            }
        }

        let id = state.next_registration_id;
        state.next_registration_id += 1;

        let registration = EventRegistration {
            id,
            event_id: new.event_id,
            user_id: new.user_id,
            status_id: new.status_id,
            registration_date: new.registration_date,
        };
        let created = state.with_relations(&registration)?;
        state.registrations.insert(id, registration);

        Ok(created)
    }

    async fn delete_registration(&self, id: i64) -> AppResult<bool> {
        let mut state = self.lock()?;
        let removed = state.registrations.remove(&id).is_some();
        if removed {
            state.attendance.retain(|a| a.registration_id != id);
            state.feedback.retain(|f| f.registration_id != id);
        }
        Ok(removed)
    }

    async fn update_registration_status(
        &self,
        id: i64,
        status_id: i32,
    ) -> AppResult<Option<RegistrationWithRelations>> {
        let mut state = self.lock()?;
        if !state.statuses.contains_key(&status_id) {
            return Err(AppError::field("status_id", "The selected status_id is invalid"));
        }
        let Some(registration) = state.registrations.get_mut(&id) else {
            return Ok(None);
        };
        registration.status_id = status_id;
        let updated = registration.clone();
        state.with_relations(&updated).map(Some)
    }

    async fn list_registrations_for_event(&self, event_id: i64) -> AppResult<Vec<RegistrationWithRelations>> {
        let state = self.lock()?;
        let mut rows: Vec<&EventRegistration> = state
            .registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .collect();
        rows.sort_by_key(|r| (r.registration_date, r.id));
        rows.into_iter().map(|r| state.with_relations(r)).collect()
    }

    async fn list_registrations_for_user(&self, user_id: i64) -> AppResult<Vec<RegistrationWithRelations>> {
        let state = self.lock()?;
        let mut rows: Vec<&EventRegistration> = state
            .registrations
            .values()
            .filter(|r| r.user_id == user_id)
            .collect();
        rows.sort_by_key(|r| std::cmp::Reverse((r.registration_date, r.id)));
        rows.into_iter().map(|r| state.with_relations(r)).collect()
    }

    async fn find_registration_details(&self, id: i64) -> AppResult<Option<RegistrationDetails>> {
        let state = self.lock()?;
        let Some(registration) = state.registrations.get(&id) else {
            return Ok(None);
        };

        let mut attendance: Vec<Attendance> = state
            .attendance
            .iter()
            .filter(|a| a.registration_id == id)
            .cloned()
            .collect();
        attendance.sort_by_key(|a| a.id);

        Ok(Some(RegistrationDetails {
            registration: state.with_relations(registration)?,
            attendance,
            feedback: state.feedback.iter().find(|f| f.registration_id == id).cloned(),
        }))
    }
}
