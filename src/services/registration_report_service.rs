//! Registration index for the admin and organizer screens

use sqlx::PgPool;

use crate::{
    constants::DEFAULT_PAGE_SIZE,
    db::repositories::{RegistrationFilter, RegistrationRepository},
    error::AppResult,
    handlers::registrations::request::ListRegistrationsQuery,
    models::RegistrationWithRelations,
    services::registration_service::Actor,
    utils::{Paginated, Pagination},
};

pub struct RegistrationReportService;

impl RegistrationReportService {
    /// Filtered registrations, newest first; students only ever see their own
    pub async fn index(
        pool: &PgPool,
        actor: &Actor,
        query: ListRegistrationsQuery,
    ) -> AppResult<Paginated<RegistrationWithRelations>> {
        let pagination = Pagination::new(query.page, query.per_page, DEFAULT_PAGE_SIZE);
        let filter = scoped_filter(actor, query);

        let (registrations, total) =
            RegistrationRepository::list(pool, &filter, pagination.offset(), pagination.limit())
                .await?;

        Ok(pagination.page_of(registrations, total))
    }
}

fn scoped_filter(actor: &Actor, query: ListRegistrationsQuery) -> RegistrationFilter {
    RegistrationFilter {
        event_id: query.event_id,
        user_id: if actor.is_staff() {
            query.user_id
        } else {
            Some(actor.user_id)
        },
        status_id: query.status_id,
        date_from: query.date_from,
        date_to: query.date_to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::roles;

    #[test]
    fn test_students_are_scoped_to_themselves() {
        let student = Actor {
            user_id: 11,
            role: roles::STUDENT.into(),
        };
        let query = ListRegistrationsQuery {
            user_id: Some(99),
            event_id: Some(3),
            ..Default::default()
        };

        let filter = scoped_filter(&student, query);
        assert_eq!(filter.user_id, Some(11));
        assert_eq!(filter.event_id, Some(3));
    }

    #[test]
    fn test_staff_filters_pass_through() {
        let admin = Actor {
            user_id: 1,
            role: roles::ADMIN.into(),
        };
        assert_eq!(scoped_filter(&admin, ListRegistrationsQuery::default()).user_id, None);

        let query = ListRegistrationsQuery {
            user_id: Some(99),
            ..Default::default()
        };
        assert_eq!(scoped_filter(&admin, query).user_id, Some(99));
    }
}
