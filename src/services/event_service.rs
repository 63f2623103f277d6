//! Event service

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    constants::EVENTS_PAGE_SIZE,
    db::repositories::{
        EventFields, EventFilter, EventRepository, RegistrationRepository,
        event_repo::EVENT_HAS_REGISTRATIONS,
    },
    error::{AppError, AppResult},
    handlers::events::request::{EventRequest, ListEventsQuery},
    models::{Event, EventDetails, EventStatistics},
    services::registration_service::Actor,
    utils::{Paginated, Pagination, validation::search_term},
};

/// Event service for business logic
pub struct EventService;

impl EventService {
    /// Paginated event index, latest start first
    pub async fn list(pool: &PgPool, query: ListEventsQuery) -> AppResult<Paginated<Event>> {
        let pagination = Pagination::new(query.page, query.per_page, EVENTS_PAGE_SIZE);
        let filter = EventFilter {
            type_id: query.type_id,
            faculty_id: query.faculty_id,
            date_from: query.date_from,
            date_to: query.date_to,
            search: search_term(query.search),
        };

        let (events, total) =
            EventRepository::list(pool, &filter, pagination.offset(), pagination.limit()).await?;

        Ok(pagination.page_of(events, total))
    }

    pub async fn get(pool: &PgPool, id: i64) -> AppResult<EventDetails> {
        EventRepository::find_details(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    /// Create an event owned by the caller (or by `organizer_id` when an admin asks)
    pub async fn create(
        pool: &PgPool,
        actor: &Actor,
        payload: EventRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Event> {
        if !actor.is_staff() {
            return Err(AppError::Forbidden(
                "Only organizers can create events".to_string(),
            ));
        }
        payload.check(now)?;

        let organizer_id = Self::organizer_for(actor, payload.organizer_id, actor.user_id);
        let event = EventRepository::create(pool, &Self::fields(payload, organizer_id)).await?;

        tracing::info!(event_id = event.id, organizer_id, "Event created");
        Ok(event)
    }

    /// Replace an event; allowed for its organizer and admins
    pub async fn update(
        pool: &PgPool,
        actor: &Actor,
        id: i64,
        payload: EventRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Event> {
        let current = Self::find_managed(pool, actor, id).await?;
        payload.check(now)?;

        let organizer_id = Self::organizer_for(actor, payload.organizer_id, current.organizer_id);
        let event = EventRepository::update(pool, id, &Self::fields(payload, organizer_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        tracing::info!(event_id = id, "Event updated");
        Ok(event)
    }

    /// Delete an event that nobody has registered for
    pub async fn delete(pool: &PgPool, actor: &Actor, id: i64) -> AppResult<()> {
        Self::find_managed(pool, actor, id).await?;

        if RegistrationRepository::exists_for_event(pool, id).await? {
            return Err(AppError::Conflict(EVENT_HAS_REGISTRATIONS.to_string()));
        }

        EventRepository::delete(pool, id).await?;
        tracing::info!(event_id = id, "Event deleted");

        Ok(())
    }

    pub async fn statistics(pool: &PgPool, now: DateTime<Utc>) -> AppResult<EventStatistics> {
        EventRepository::statistics(pool, now).await
    }

    /// Load an event the actor may modify
    async fn find_managed(pool: &PgPool, actor: &Actor, id: i64) -> AppResult<Event> {
        let event = EventRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if !can_manage(actor, &event) {
            return Err(AppError::Forbidden(
                "Only the organizer or an admin can modify this event".to_string(),
            ));
        }

        Ok(event)
    }

    fn organizer_for(actor: &Actor, requested: Option<i64>, fallback: i64) -> i64 {
        match requested {
            Some(id) if actor.is_admin() => id,
            _ => fallback,
        }
    }

    fn fields(payload: EventRequest, organizer_id: i64) -> EventFields {
        EventFields {
            title: payload.title,
            description: payload.description,
            type_id: payload.type_id,
            start_date_time: payload.start_date_time,
            end_date_time: payload.end_date_time,
            location: payload.location,
            organizer_id,
            max_participants: payload.max_participants,
            faculty_id: payload.faculty_id,
            budget: payload.budget,
            image_url: payload.image_url,
        }
    }
}

/// Organizers manage their own events, admins manage all of them
pub fn can_manage(actor: &Actor, event: &Event) -> bool {
    actor.is_admin() || (actor.is_staff() && event.organizer_id == actor.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::roles;
    use chrono::Duration;

    fn actor(user_id: i64, role: &str) -> Actor {
        Actor {
            user_id,
            role: role.to_string(),
        }
    }

    fn event(organizer_id: i64) -> Event {
        let now = Utc::now();
        Event {
            id: 1,
            title: "Career fair".into(),
            description: None,
            type_id: 2,
            start_date_time: now + Duration::days(1),
            end_date_time: now + Duration::days(2),
            location: "Hall B".into(),
            organizer_id,
            max_participants: None,
            faculty_id: None,
            budget: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_can_manage() {
        let event = event(7);
        assert!(can_manage(&actor(7, roles::ORGANIZER), &event));
        assert!(can_manage(&actor(1, roles::ADMIN), &event));
        assert!(!can_manage(&actor(8, roles::ORGANIZER), &event));
        assert!(!can_manage(&actor(7, roles::STUDENT), &event));
    }

    #[test]
    fn test_only_admins_reassign_organizer() {
        assert_eq!(EventService::organizer_for(&actor(1, roles::ADMIN), Some(9), 1), 9);
        assert_eq!(EventService::organizer_for(&actor(7, roles::ORGANIZER), Some(9), 7), 7);
        assert_eq!(EventService::organizer_for(&actor(1, roles::ADMIN), None, 5), 5);
    }
}
