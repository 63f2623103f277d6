//! User repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{NamedCount, Role, User, UserStatistics},
};

/// Users joined with their role name
const USER_SELECT: &str = r#"
    SELECT u.*, r.name AS role_name
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

/// Columns for a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub telegram_id: Option<String>,
    pub password_hash: String,
    pub role_id: i32,
    pub group_id: Option<i32>,
    pub is_active: bool,
}

/// Partial update; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub telegram_id: Option<String>,
    pub role_id: Option<i32>,
    pub group_id: Option<i32>,
    pub is_active: Option<bool>,
}

/// Filters accepted by the user index
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role_id: Option<i32>,
    pub group_id: Option<i32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for user database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(pool: &PgPool, new: &NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            WITH inserted AS (
                INSERT INTO users (
                    first_name, last_name, email, phone, telegram_id,
                    password_hash, role_id, group_id, is_active
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
            )
            SELECT inserted.*, r.name AS role_name
            FROM inserted
            JOIN roles r ON r.id = inserted.role_id
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.telegram_id)
        .bind(&new.password_hash)
        .bind(new.role_id)
        .bind(new.group_id)
        .bind(new.is_active)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE u.id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find user by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE LOWER(u.email) = LOWER($1)");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Update profile fields
    pub async fn update(pool: &PgPool, id: i64, changes: &UserChanges) -> AppResult<Option<User>> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                telegram_id = COALESCE($6, telegram_id),
                role_id = COALESCE($7, role_id),
                group_id = COALESCE($8, group_id),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.telegram_id)
        .bind(changes.role_id)
        .bind(changes.group_id)
        .bind(changes.is_active)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }

    pub async fn update_password(pool: &PgPool, id: i64, password_hash: &str) -> AppResult<()> {
        sqlx::query(r#"UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1"#)
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Update last login timestamp
    pub async fn update_last_login(pool: &PgPool, id: i64) -> AppResult<()> {
        sqlx::query(r#"UPDATE users SET last_login_at = NOW() WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn deactivate(pool: &PgPool, id: i64) -> AppResult<()> {
        sqlx::query(r#"UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// List users ordered by last then first name
    pub async fn list(
        pool: &PgPool,
        filter: &UserFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        const WHERE: &str = r#"
            WHERE
                ($1::int IS NULL OR u.role_id = $1)
                AND ($2::int IS NULL OR u.group_id = $2)
                AND ($3::text IS NULL OR u.first_name ILIKE $3 OR u.last_name ILIKE $3 OR u.email ILIKE $3)
                AND ($4::boolean IS NULL OR u.is_active = $4)
        "#;
        let search_pattern = filter.search.as_ref().map(|s| format!("%{}%", s));

        let sql = format!("{USER_SELECT} {WHERE} ORDER BY u.last_name, u.first_name, u.id OFFSET $5 LIMIT $6");
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(filter.role_id)
            .bind(filter.group_id)
            .bind(&search_pattern)
            .bind(filter.is_active)
            .bind(offset)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM users u {WHERE}");
        let count: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.role_id)
            .bind(filter.group_id)
            .bind(&search_pattern)
            .bind(filter.is_active)
            .fetch_one(pool)
            .await?;

        Ok((users, count))
    }

    pub async fn statistics(pool: &PgPool) -> AppResult<UserStatistics> {
        let (total_users, active_users): (i64, i64) = sqlx::query_as(
            r#"SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM users"#,
        )
        .fetch_one(pool)
        .await?;

        let users_by_role = sqlx::query_as::<_, NamedCount>(
            r#"
            SELECT r.id, r.name, COUNT(u.id) AS count
            FROM roles r
            LEFT JOIN users u ON u.role_id = r.id
            GROUP BY r.id, r.name
            ORDER BY r.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(UserStatistics {
            total_users,
            active_users,
            inactive_users: total_users - active_users,
            users_by_role,
        })
    }

    pub async fn find_role_by_name(pool: &PgPool, name: &str) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(r#"SELECT id, name FROM roles WHERE name = $1"#)
            .bind(name)
            .fetch_optional(pool)
            .await?;

        Ok(role)
    }

    pub async fn find_role_by_id(pool: &PgPool, id: i32) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(r#"SELECT id, name FROM roles WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(role)
    }
}
