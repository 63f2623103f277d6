//! Seeded lookup tables

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{EventType, Faculty, Group, RegistrationStatus, Role},
};

/// Everything a client needs to fill in event and user forms
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReferenceData {
    pub roles: Vec<Role>,
    pub faculties: Vec<Faculty>,
    pub groups: Vec<Group>,
    pub event_types: Vec<EventType>,
    pub registration_statuses: Vec<RegistrationStatus>,
}

pub struct ReferenceRepository;

impl ReferenceRepository {
    pub async fn all(pool: &PgPool) -> AppResult<ReferenceData> {
        let (roles, faculties, groups, event_types, registration_statuses) = futures::try_join!(
            sqlx::query_as::<_, Role>(r#"SELECT id, name FROM roles ORDER BY id"#).fetch_all(pool),
            sqlx::query_as::<_, Faculty>(r#"SELECT id, name FROM faculties ORDER BY name"#)
                .fetch_all(pool),
            sqlx::query_as::<_, Group>(r#"SELECT id, name, faculty_id FROM groups ORDER BY name"#)
                .fetch_all(pool),
            sqlx::query_as::<_, EventType>(r#"SELECT id, name FROM event_types ORDER BY id"#)
                .fetch_all(pool),
            sqlx::query_as::<_, RegistrationStatus>(
                r#"SELECT id, name FROM registration_statuses ORDER BY id"#
            )
            .fetch_all(pool),
        )?;

        Ok(ReferenceData {
            roles,
            faculties,
            groups,
            event_types,
            registration_statuses,
        })
    }
}
