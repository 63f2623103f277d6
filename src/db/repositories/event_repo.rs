//! Event repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::{
    error::{AppError, AppResult},
    models::{Event, EventDetails, EventStatistics, NamedCount, UserSummary},
};

pub const EVENT_HAS_REGISTRATIONS: &str = "Cannot delete event with existing registrations";

/// Every writable event column; used for create and full update
#[derive(Debug, Clone)]
pub struct EventFields {
    pub title: String,
    pub description: Option<String>,
    pub type_id: i32,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub location: String,
    pub organizer_id: i64,
    pub max_participants: Option<i32>,
    pub faculty_id: Option<i32>,
    pub budget: Option<f64>,
    pub image_url: Option<String>,
}

/// Filters accepted by the event index
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub type_id: Option<i32>,
    pub faculty_id: Option<i32>,
    /// Events starting at or after this instant
    pub date_from: Option<DateTime<Utc>>,
    /// Events ending at or before this instant
    pub date_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

#[derive(Debug, FromRow)]
struct EventDetailsRow {
    #[sqlx(flatten)]
    event: Event,
    type_name: Option<String>,
    faculty_name: Option<String>,
    organizer_first_name: Option<String>,
    organizer_last_name: Option<String>,
    organizer_email: Option<String>,
    registrations_count: i64,
}

/// Repository for event database operations
pub struct EventRepository;

impl EventRepository {
    /// Create a new event
    pub async fn create(pool: &PgPool, new: &EventFields) -> AppResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                title, description, type_id, start_date_time, end_date_time, location,
                organizer_id, max_participants, faculty_id, budget, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.type_id)
        .bind(new.start_date_time)
        .bind(new.end_date_time)
        .bind(&new.location)
        .bind(new.organizer_id)
        .bind(new.max_participants)
        .bind(new.faculty_id)
        .bind(new.budget)
        .bind(&new.image_url)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(r#"SELECT * FROM events WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(event)
    }

    /// Event with type, faculty, organizer and registration count
    pub async fn find_details(pool: &PgPool, id: i64) -> AppResult<Option<EventDetails>> {
        let row = sqlx::query_as::<_, EventDetailsRow>(
            r#"
            SELECT
                e.*,
                t.name AS type_name,
                f.name AS faculty_name,
                u.first_name AS organizer_first_name,
                u.last_name AS organizer_last_name,
                u.email AS organizer_email,
                (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id) AS registrations_count
            FROM events e
            LEFT JOIN event_types t ON t.id = e.type_id
            LEFT JOIN faculties f ON f.id = e.faculty_id
            LEFT JOIN users u ON u.id = e.organizer_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|row| {
            let organizer = match (row.organizer_first_name, row.organizer_last_name, row.organizer_email) {
                (Some(first_name), Some(last_name), Some(email)) => Some(UserSummary {
                    id: row.event.organizer_id,
                    first_name,
                    last_name,
                    email,
                }),
                _ => None,
            };
            EventDetails {
                event: row.event,
                type_name: row.type_name,
                faculty_name: row.faculty_name,
                organizer,
                registrations_count: row.registrations_count,
            }
        }))
    }

    /// Replace every writable column of an event
    pub async fn update(pool: &PgPool, id: i64, fields: &EventFields) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET
                title = $2,
                description = $3,
                type_id = $4,
                start_date_time = $5,
                end_date_time = $6,
                location = $7,
                organizer_id = $8,
                max_participants = $9,
                faculty_id = $10,
                budget = $11,
                image_url = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.type_id)
        .bind(fields.start_date_time)
        .bind(fields.end_date_time)
        .bind(&fields.location)
        .bind(fields.organizer_id)
        .bind(fields.max_participants)
        .bind(fields.faculty_id)
        .bind(fields.budget)
        .bind(&fields.image_url)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// Delete event; registrations hold it through `ON DELETE RESTRICT`
    pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM events WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::Conflict(EVENT_HAS_REGISTRATIONS.to_string())
                }
                other => other.into(),
            })?;

        Ok(())
    }

    /// List events with pagination, latest start first
    pub async fn list(
        pool: &PgPool,
        filter: &EventFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Event>, i64)> {
        const WHERE: &str = r#"
            WHERE
                ($1::int IS NULL OR type_id = $1)
                AND ($2::int IS NULL OR faculty_id = $2)
                AND ($3::timestamptz IS NULL OR start_date_time >= $3)
                AND ($4::timestamptz IS NULL OR end_date_time <= $4)
                AND ($5::text IS NULL OR title ILIKE $5)
        "#;
        let search_pattern = filter.search.as_ref().map(|s| format!("%{}%", s));

        let sql = format!("SELECT * FROM events {WHERE} ORDER BY start_date_time DESC, id DESC OFFSET $6 LIMIT $7");
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(filter.type_id)
            .bind(filter.faculty_id)
            .bind(filter.date_from)
            .bind(filter.date_to)
            .bind(&search_pattern)
            .bind(offset)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM events {WHERE}");
        let count: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.type_id)
            .bind(filter.faculty_id)
            .bind(filter.date_from)
            .bind(filter.date_to)
            .bind(&search_pattern)
            .fetch_one(pool)
            .await?;

        Ok((events, count))
    }

    /// Totals and grouped breakdowns relative to `now`
    pub async fn statistics(pool: &PgPool, now: DateTime<Utc>) -> AppResult<EventStatistics> {
        let (total_events, upcoming_events, past_events): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE start_date_time > $1),
                COUNT(*) FILTER (WHERE end_date_time < $1)
            FROM events
            "#,
        )
        .bind(now)
        .fetch_one(pool)
        .await?;

        let events_by_type = sqlx::query_as::<_, NamedCount>(
            r#"
            SELECT t.id, t.name, COUNT(e.id) AS count
            FROM events e
            JOIN event_types t ON t.id = e.type_id
            GROUP BY t.id, t.name
            ORDER BY count DESC, t.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        let events_by_faculty = sqlx::query_as::<_, NamedCount>(
            r#"
            SELECT f.id, f.name, COUNT(e.id) AS count
            FROM events e
            LEFT JOIN faculties f ON f.id = e.faculty_id
            GROUP BY f.id, f.name
            ORDER BY count DESC, f.id NULLS LAST
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(EventStatistics {
            total_events,
            upcoming_events,
            past_events,
            events_by_type,
            events_by_faculty,
        })
    }

    pub async fn count_by_organizer(pool: &PgPool, organizer_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM events WHERE organizer_id = $1"#)
            .bind(organizer_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Most recently started events organized by a user
    pub async fn recent_by_organizer(pool: &PgPool, organizer_id: i64, limit: i64) -> AppResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"SELECT * FROM events WHERE organizer_id = $1 ORDER BY start_date_time DESC, id DESC LIMIT $2"#,
        )
        .bind(organizer_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }
}
