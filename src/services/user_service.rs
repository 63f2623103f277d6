//! User service

use sqlx::PgPool;

use crate::{
    constants::{DEFAULT_PAGE_SIZE, PROFILE_RECENT_ITEMS, roles},
    db::repositories::{
        EventRepository, NewUser, PointsRepository, RegistrationRepository, UserChanges, UserFilter,
        UserRepository,
    },
    error::{AppError, AppResult},
    handlers::{
        auth::request::ChangePasswordRequest,
        users::{
            request::{CreateUserRequest, ListUsersQuery, UpdateUserRequest},
            response::{RecentActivities, UserProfileResponse},
        },
    },
    models::{User, UserProfileStats, UserStatistics},
    services::{AuthService, registration_service::Actor},
    utils::{Paginated, Pagination, validation::search_term},
};

/// What `DELETE /users/{id}` ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The user owns events or registrations and was only deactivated
    Deactivated,
    Deleted,
}

/// User service for business logic
pub struct UserService;

impl UserService {
    /// Paginated user index ordered by last and first name
    pub async fn list(pool: &PgPool, query: ListUsersQuery) -> AppResult<Paginated<User>> {
        let pagination = Pagination::new(query.page, query.per_page, DEFAULT_PAGE_SIZE);
        let filter = UserFilter {
            role_id: query.role_id,
            group_id: query.group_id,
            search: search_term(query.search),
            is_active: query.is_active,
        };

        let (users, total) =
            UserRepository::list(pool, &filter, pagination.offset(), pagination.limit()).await?;

        Ok(pagination.page_of(users, total))
    }

    /// Get user by ID
    pub async fn get(pool: &PgPool, id: i64) -> AppResult<User> {
        UserRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Create an account with any role
    pub async fn create(pool: &PgPool, payload: CreateUserRequest) -> AppResult<User> {
        Self::ensure_email_free(pool, &payload.email, None).await?;

        let role = UserRepository::find_role_by_id(pool, payload.role_id)
            .await?
            .ok_or_else(|| AppError::field("role_id", "The selected role_id is invalid"))?;
        if role.name == roles::STUDENT && payload.group_id.is_none() {
            return Err(AppError::field("group_id", "Group is required for students"));
        }

        let password_hash = AuthService::hash_password(&payload.password)?;
        let user = UserRepository::create(
            pool,
            &NewUser {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                phone: payload.phone,
                telegram_id: payload.telegram_id,
                password_hash,
                role_id: role.id,
                group_id: payload.group_id,
                is_active: payload.is_active.unwrap_or(true),
            },
        )
        .await?;

        tracing::info!(user_id = user.id, role = %role.name, "User created");
        Ok(user)
    }

    /// Update a user; the user themself or an admin
    pub async fn update(
        pool: &PgPool,
        actor: &Actor,
        id: i64,
        payload: UpdateUserRequest,
    ) -> AppResult<User> {
        if actor.user_id != id && !actor.is_admin() {
            return Err(AppError::Forbidden(
                "Cannot update other users' profiles".to_string(),
            ));
        }
        if payload.touches_admin_fields() && !actor.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can change role or activity".to_string(),
            ));
        }

        if let Some(email) = payload.email.as_deref() {
            Self::ensure_email_free(pool, email, Some(id)).await?;
        }
        if let Some(role_id) = payload.role_id {
            if UserRepository::find_role_by_id(pool, role_id).await?.is_none() {
                return Err(AppError::field("role_id", "The selected role_id is invalid"));
            }
        }

        let changes = UserChanges {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone: payload.phone,
            telegram_id: payload.telegram_id,
            role_id: payload.role_id,
            group_id: payload.group_id,
            is_active: payload.is_active,
        };

        let user = UserRepository::update(pool, id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = id, updated_by = actor.user_id, "User updated");
        Ok(user)
    }

    /// Delete a user, or deactivate them when events or registrations reference them
    pub async fn remove(pool: &PgPool, actor: &Actor, id: i64) -> AppResult<RemovalOutcome> {
        if actor.user_id == id {
            return Err(AppError::Conflict(
                "You cannot delete your own account".to_string(),
            ));
        }
        Self::get(pool, id).await?;

        let organized = EventRepository::count_by_organizer(pool, id).await?;
        let registered = RegistrationRepository::exists_for_user(pool, id).await?;

        if organized > 0 || registered {
            UserRepository::deactivate(pool, id).await?;
            tracing::info!(user_id = id, "User deactivated (has related records)");
            return Ok(RemovalOutcome::Deactivated);
        }

        UserRepository::delete(pool, id).await?;
        tracing::info!(user_id = id, "User deleted");

        Ok(RemovalOutcome::Deleted)
    }

    pub async fn statistics(pool: &PgPool) -> AppResult<UserStatistics> {
        UserRepository::statistics(pool).await
    }

    /// User with activity counters and their latest events and registrations
    pub async fn profile(pool: &PgPool, id: i64) -> AppResult<UserProfileResponse> {
        let user = Self::get(pool, id).await?;

        let (organized_events, participated_events, total_points, events, registrations) = futures::try_join!(
            EventRepository::count_by_organizer(pool, id),
            RegistrationRepository::count_participated_events(pool, id),
            PointsRepository::total_for_user(pool, id),
            EventRepository::recent_by_organizer(pool, id, PROFILE_RECENT_ITEMS),
            RegistrationRepository::recent_for_user(pool, id, PROFILE_RECENT_ITEMS),
        )?;

        let statistics = UserProfileStats {
            organized_events,
            participated_events,
            total_points,
        };
        let recent_activities = RecentActivities {
            events,
            registrations,
        };

        Ok(UserProfileResponse {
            user,
            statistics,
            recent_activities,
        })
    }

    /// Set a password; the owner must confirm the current one, admins may reset others
    pub async fn set_password(
        pool: &PgPool,
        actor: &Actor,
        id: i64,
        payload: ChangePasswordRequest,
    ) -> AppResult<()> {
        payload.check()?;

        if actor.user_id == id {
            return AuthService::change_password(pool, id, payload).await;
        }
        if !actor.is_admin() {
            return Err(AppError::Forbidden(
                "Cannot change other users' passwords".to_string(),
            ));
        }

        Self::get(pool, id).await?;
        let password_hash = AuthService::hash_password(&payload.password)?;
        UserRepository::update_password(pool, id, &password_hash).await?;

        tracing::info!(user_id = id, reset_by = actor.user_id, "Password reset");
        Ok(())
    }

    async fn ensure_email_free(pool: &PgPool, email: &str, owner: Option<i64>) -> AppResult<()> {
        match UserRepository::find_by_email(pool, email).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::field(
                "email",
                "The email has already been taken",
            )),
            _ => Ok(()),
        }
    }
}

/// Users may read their own record; staff may read anyone's
pub fn can_view(actor: &Actor, user_id: i64) -> bool {
    actor.user_id == user_id || actor.is_staff()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_view() {
        let student = Actor {
            user_id: 3,
            role: roles::STUDENT.into(),
        };
        let organizer = Actor {
            user_id: 4,
            role: roles::ORGANIZER.into(),
        };
        assert!(can_view(&student, 3));
        assert!(!can_view(&student, 4));
        assert!(can_view(&organizer, 3));
    }
}
