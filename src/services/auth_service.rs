//! Authentication service

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    config::JwtConfig,
    constants::roles,
    db::repositories::{NewUser, UserChanges, UserRepository},
    error::{AppError, AppResult},
    handlers::auth::{
        request::{ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest},
        response::AuthResponse,
    },
    models::User,
};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub role: String,
    /// Token id, used for revocation
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

fn revoked_token_key(jti: &str) -> String {
    format!("revoked_token:{jti}")
}

fn revoked_before_key(user_id: i64) -> String {
    format!("tokens_revoked_before:{user_id}")
}

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Register a student account and sign it in
    pub async fn register(pool: &PgPool, jwt: &JwtConfig, payload: RegisterRequest) -> AppResult<AuthResponse> {
        if UserRepository::find_by_email(pool, &payload.email).await?.is_some() {
            return Err(AppError::field("email", "The email has already been taken"));
        }

        let role = UserRepository::find_role_by_name(pool, roles::STUDENT)
            .await?
            .ok_or_else(|| AppError::Configuration("role 'student' is not seeded".to_string()))?;

        let password_hash = Self::hash_password(&payload.password)?;

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
                is_active: true,
            },
        )
        .await?;

        tracing::info!(user_id = user.id, "User registered");

        let (token, expires_in) = Self::issue_token(&user, jwt, Utc::now())?;
        Ok(AuthResponse::bearer(user, token, expires_in))
    }

    /// Login with email and password
    pub async fn login(pool: &PgPool, jwt: &JwtConfig, payload: LoginRequest) -> AppResult<AuthResponse> {
        let user = UserRepository::find_by_email(pool, &payload.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !Self::verify_password(&payload.password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        UserRepository::update_last_login(pool, user.id).await?;

        let (token, expires_in) = Self::issue_token(&user, jwt, Utc::now())?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(AuthResponse::bearer(user, token, expires_in))
    }

    /// Revoke the presented token until it would have expired anyway
    pub async fn logout(mut redis: ConnectionManager, claims: &Claims) -> AppResult<()> {
        let ttl = (claims.exp - Utc::now().timestamp()).max(1);
        redis
            .set_ex::<_, _, ()>(revoked_token_key(&claims.jti), "1", ttl as u64)
            .await?;

        Ok(())
    }

    /// Revoke every token of the user issued up to now
    pub async fn logout_all(mut redis: ConnectionManager, jwt: &JwtConfig, user_id: i64) -> AppResult<()> {
        let ttl = jwt.expiry_hours.max(1) * 3600;
        redis
            .set_ex::<_, _, ()>(revoked_before_key(user_id), Utc::now().timestamp(), ttl as u64)
            .await?;

        tracing::info!(user_id, "All sessions revoked");
        Ok(())
    }

    /// Whether logout or logout-all revoked this token
    pub async fn is_revoked(mut redis: ConnectionManager, claims: &Claims, user_id: i64) -> AppResult<bool> {
        let revoked: bool = redis.exists(revoked_token_key(&claims.jti)).await?;
        if revoked {
            return Ok(true);
        }

        let revoked_before: Option<i64> = redis.get(revoked_before_key(user_id)).await?;
        Ok(revoked_before.is_some_and(|cutoff| claims.iat <= cutoff))
    }

    /// Update the caller's own profile
    pub async fn update_profile(pool: &PgPool, user_id: i64, payload: UpdateProfileRequest) -> AppResult<User> {
        let changes = UserChanges {
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            telegram_id: payload.telegram_id,
            group_id: payload.group_id,
            ..UserChanges::default()
        };

        UserRepository::update(pool, user_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Change the caller's own password after checking the current one
    pub async fn change_password(pool: &PgPool, user_id: i64, payload: ChangePasswordRequest) -> AppResult<()> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let current = payload.current_password.as_deref().unwrap_or_default();
        if !Self::verify_password(current, &user.password_hash)? {
            return Err(AppError::field(
                "current_password",
                "The current password is incorrect",
            ));
        }

        let password_hash = Self::hash_password(&payload.password)?;
        UserRepository::update_password(pool, user_id, &password_hash).await
    }

    /// Verify JWT token and extract claims
    pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Hash password using Argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(hash)
    }

    /// Verify password against hash
    pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Sign an access token; returns it with its lifetime in seconds
    pub fn issue_token(user: &User, jwt: &JwtConfig, now: DateTime<Utc>) -> AppResult<(String, i64)> {
        let expires_at = now + Duration::hours(jwt.expiry_hours);
        let expires_in = jwt.expiry_hours * 3600;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role_name.clone(),
            jti: Uuid::new_v4().to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))?;

        Ok((token, expires_in))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            expiry_hours: 2,
        }
    }

    fn user() -> User {
        User {
            id: 42,
            first_name: "Oleg".into(),
            last_name: "Smirnov".into(),
            email: "oleg@college.edu".into(),
            phone: None,
            telegram_id: None,
            password_hash: String::new(),
            role_id: 2,
            role_name: roles::ORGANIZER.into(),
            group_id: None,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = AuthService::hash_password("Secur3!pass").unwrap();
        assert!(AuthService::verify_password("Secur3!pass", &hash).unwrap());
        assert!(!AuthService::verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_issued_token_carries_identity() {
        let (token, expires_in) = AuthService::issue_token(&user(), &jwt(), Utc::now()).unwrap();
        assert_eq!(expires_in, 7200);

        let claims = AuthService::verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, roles::ORGANIZER);
        assert_eq!(claims.email, "oleg@college.edu");
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_each_token_has_distinct_jti() {
        let now = Utc::now();
        let (a, _) = AuthService::issue_token(&user(), &jwt(), now).unwrap();
        let (b, _) = AuthService::issue_token(&user(), &jwt(), now).unwrap();
        let a = AuthService::verify_token(&a, "test-secret").unwrap();
        let b = AuthService::verify_token(&b, "test-secret").unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_and_tampered_tokens_are_rejected() {
        let (expired, _) =
            AuthService::issue_token(&user(), &jwt(), Utc::now() - Duration::hours(5)).unwrap();
        assert!(matches!(
            AuthService::verify_token(&expired, "test-secret"),
            Err(AppError::TokenExpired)
        ));

        let (token, _) = AuthService::issue_token(&user(), &jwt(), Utc::now()).unwrap();
        assert!(matches!(
            AuthService::verify_token(&token, "other-secret"),
            Err(AppError::InvalidToken)
        ));
    }
}
