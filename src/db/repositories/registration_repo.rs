//! Registration repository and the Postgres registration gateway

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{EventRepository, UserRepository};
use crate::{
    db::gateway::RegistrationGateway,
    error::{AppError, AppResult},
    models::{
        Attendance, Event, EventRegistration, EventSummary, Feedback, NewRegistration,
        RegistrationDetails, RegistrationStatus, RegistrationWithRelations, StatusName, User,
        UserSummary,
    },
};

/// Registration joined with its event, user and status in one flat row
const REGISTRATION_SELECT: &str = r#"
    SELECT
        r.id, r.event_id, r.user_id, r.status_id, r.registration_date,
        e.title AS event_title,
        e.start_date_time AS event_start_date_time,
        e.end_date_time AS event_end_date_time,
        e.location AS event_location,
        e.organizer_id AS event_organizer_id,
        e.max_participants AS event_max_participants,
        u.first_name AS user_first_name,
        u.last_name AS user_last_name,
        u.email AS user_email,
        s.name AS status_name
    FROM event_registrations r
    JOIN events e ON e.id = r.event_id
    JOIN users u ON u.id = r.user_id
    JOIN registration_statuses s ON s.id = r.status_id
"#;

#[derive(Debug, FromRow)]
struct RegistrationRow {
    id: i64,
    event_id: i64,
    user_id: i64,
    status_id: i32,
    registration_date: DateTime<Utc>,
    event_title: String,
    event_start_date_time: DateTime<Utc>,
    event_end_date_time: DateTime<Utc>,
    event_location: String,
    event_organizer_id: i64,
    event_max_participants: Option<i32>,
    user_first_name: String,
    user_last_name: String,
    user_email: String,
    status_name: String,
}

impl From<RegistrationRow> for RegistrationWithRelations {
    fn from(row: RegistrationRow) -> Self {
        Self {
            registration: EventRegistration {
                id: row.id,
                event_id: row.event_id,
                user_id: row.user_id,
                status_id: row.status_id,
                registration_date: row.registration_date,
            },
            event: EventSummary {
                id: row.event_id,
                title: row.event_title,
                start_date_time: row.event_start_date_time,
                end_date_time: row.event_end_date_time,
                location: row.event_location,
                organizer_id: row.event_organizer_id,
                max_participants: row.event_max_participants,
            },
            user: UserSummary {
                id: row.user_id,
                first_name: row.user_first_name,
                last_name: row.user_last_name,
                email: row.user_email,
            },
            status: RegistrationStatus {
                id: row.status_id,
                name: row.status_name,
            },
        }
    }
}

fn status_names(statuses: &[StatusName]) -> Vec<&'static str> {
    statuses.iter().map(StatusName::as_str).collect()
}

/// Filters accepted by the registration index
#[derive(Debug, Default, Clone)]
pub struct RegistrationFilter {
    pub event_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status_id: Option<i32>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Read-side registration queries
pub struct RegistrationRepository;

impl RegistrationRepository {
    /// Paginated index, newest registrations first
    pub async fn list(
        pool: &PgPool,
        filter: &RegistrationFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<RegistrationWithRelations>, i64)> {
        const WHERE: &str = r#"
            WHERE
                ($1::bigint IS NULL OR r.event_id = $1)
                AND ($2::bigint IS NULL OR r.user_id = $2)
                AND ($3::int IS NULL OR r.status_id = $3)
                AND ($4::timestamptz IS NULL OR r.registration_date >= $4)
                AND ($5::timestamptz IS NULL OR r.registration_date <= $5)
        "#;

        let sql = format!("{REGISTRATION_SELECT} {WHERE} ORDER BY r.registration_date DESC, r.id DESC OFFSET $6 LIMIT $7");
        let rows = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(filter.event_id)
            .bind(filter.user_id)
            .bind(filter.status_id)
            .bind(filter.date_from)
            .bind(filter.date_to)
            .bind(offset)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM event_registrations r {WHERE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.event_id)
            .bind(filter.user_id)
            .bind(filter.status_id)
            .bind(filter.date_from)
            .bind(filter.date_to)
            .fetch_one(pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Most recent registrations of a user, for profile pages
    pub async fn recent_for_user(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
    ) -> AppResult<Vec<RegistrationWithRelations>> {
        let sql = format!("{REGISTRATION_SELECT} WHERE r.user_id = $1 ORDER BY r.registration_date DESC, r.id DESC LIMIT $2");
        let rows = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Distinct events a user has registered for
    pub async fn count_participated_events(pool: &PgPool, user_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(DISTINCT event_id) FROM event_registrations WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    pub async fn exists_for_user(pool: &PgPool, user_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM event_registrations WHERE user_id = $1)"#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    pub async fn exists_for_event(pool: &PgPool, event_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1)"#,
        )
        .bind(event_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

/// Registration gateway over Postgres
#[derive(Debug, Clone)]
pub struct PgRegistrationGateway {
    pool: PgPool,
}

impl PgRegistrationGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_with_relations<'e, E>(executor: E, id: i64) -> AppResult<Option<RegistrationWithRelations>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let sql = format!("{REGISTRATION_SELECT} WHERE r.id = $1");
        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl RegistrationGateway for PgRegistrationGateway {
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        UserRepository::find_by_id(&self.pool, id).await
    }

    async fn find_event_by_id(&self, id: i64) -> AppResult<Option<Event>> {
        EventRepository::find_by_id(&self.pool, id).await
    }

    async fn find_registration_by_id(&self, id: i64) -> AppResult<Option<RegistrationWithRelations>> {
        Self::fetch_with_relations(&self.pool, id).await
    }

    async fn find_registration_by_event_and_user(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> AppResult<Option<EventRegistration>> {
        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"SELECT * FROM event_registrations WHERE event_id = $1 AND user_id = $2"#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    async fn count_registrations_by_event_and_status_names(
        &self,
        event_id: i64,
        statuses: &[StatusName],
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM event_registrations r
            JOIN registration_statuses s ON s.id = r.status_id
            WHERE r.event_id = $1 AND s.name = ANY($2)
            "#,
        )
        .bind(event_id)
        .bind(status_names(statuses))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn find_status_by_name(&self, name: StatusName) -> AppResult<Option<RegistrationStatus>> {
        let status = sqlx::query_as::<_, RegistrationStatus>(
            r#"SELECT id, name FROM registration_statuses WHERE name = $1"#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(status)
    }

    async fn find_status_by_id(&self, id: i32) -> AppResult<Option<RegistrationStatus>> {
        let status = sqlx::query_as::<_, RegistrationStatus>(
            r#"SELECT id, name FROM registration_statuses WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(status)
    }

    async fn insert_registration(&self, new: NewRegistration) -> AppResult<RegistrationWithRelations> {
        let mut tx = self.pool.begin().await?;

        // Serializes every insert for the same event on the event row
        let max_participants: Option<Option<i32>> =
            sqlx::query_scalar(r#"SELECT max_participants FROM events WHERE id = $1 FOR UPDATE"#)
                .bind(new.event_id)
                .fetch_optional(&mut *tx)
                .await?;
        let max_participants =
            max_participants.ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let duplicate: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1 AND user_id = $2)"#,
        )
        .bind(new.event_id)
        .bind(new.user_id)
        .fetch_one(&mut *tx)
        .await?;
        if duplicate {
            return Err(AppError::DuplicateRegistration);
        }

        if let Some(max) = max_participants {
            let taken: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM event_registrations r
                JOIN registration_statuses s ON s.id = r.status_id
                WHERE r.event_id = $1 AND s.name = ANY($2)
                "#,
            )
            .bind(new.event_id)
            .bind(status_names(StatusName::CAPACITY_HOLDING))
            .fetch_one(&mut *tx)
            .await?;

            if taken >= i64::from(max) {
                return Err(AppError::CapacityExceeded);
            }
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO event_registrations (event_id, user_id, status_id, registration_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(new.event_id)
        .bind(new.user_id)
        .bind(new.status_id)
        .bind(new.registration_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateRegistration,
            other => AppError::from(other),
        })?;

        let created = Self::fetch_with_relations(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::Database(format!("registration {id} missing after insert")))?;

        tx.commit().await?;

        Ok(created)
    }

    async fn delete_registration(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM event_registrations WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_registration_status(
        &self,
        id: i64,
        status_id: i32,
    ) -> AppResult<Option<RegistrationWithRelations>> {
        let result = sqlx::query(r#"UPDATE event_registrations SET status_id = $2 WHERE id = $1"#)
            .bind(id)
            .bind(status_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::fetch_with_relations(&self.pool, id).await
    }

    async fn list_registrations_for_event(&self, event_id: i64) -> AppResult<Vec<RegistrationWithRelations>> {
        let sql = format!("{REGISTRATION_SELECT} WHERE r.event_id = $1 ORDER BY r.registration_date ASC, r.id ASC");
        let rows = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_registrations_for_user(&self, user_id: i64) -> AppResult<Vec<RegistrationWithRelations>> {
        let sql = format!("{REGISTRATION_SELECT} WHERE r.user_id = $1 ORDER BY r.registration_date DESC, r.id DESC");
        let rows = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_registration_details(&self, id: i64) -> AppResult<Option<RegistrationDetails>> {
        let Some(registration) = Self::fetch_with_relations(&self.pool, id).await? else {
            return Ok(None);
        };

        let attendance = sqlx::query_as::<_, Attendance>(
            r#"SELECT * FROM attendance WHERE registration_id = $1 ORDER BY id"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let feedback = sqlx::query_as::<_, Feedback>(
            r#"SELECT * FROM feedback WHERE registration_id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(Some(RegistrationDetails {
            registration,
            attendance,
            feedback,
        }))
    }
}
