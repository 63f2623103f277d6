//! Authentication middleware

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{
    constants::roles,
    error::{AppError, AppResult},
    services::{AuthService, auth_service::Claims, registration_service::Actor},
    state::AppState,
};

/// Authenticated user extracted from JWT
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == roles::ADMIN
    }

    pub fn is_staff(&self) -> bool {
        roles::STAFF.contains(&self.role.as_str())
    }

    pub fn require_staff(&self) -> AppResult<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Organizer or admin role required".to_string()))
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin role required".to_string()))
        }
    }

    /// Acting identity handed to the registration engine
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            role: self.role.clone(),
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let Some(token) = bearer_token(&request) else {
        debug!(path = %path, "Auth failed: missing or malformed Authorization header");
        return Err(AppError::Unauthorized);
    };

    let claims = AuthService::verify_token(token, &state.config().jwt.secret).map_err(|e| {
        debug!(path = %path, error = ?e, "Auth failed: token verification failed");
        e
    })?;

    let user_id: i64 = claims.sub.parse().map_err(|_| {
        debug!(path = %path, sub = %claims.sub, "Auth failed: invalid user id in token");
        AppError::InvalidToken
    })?;

    if AuthService::is_revoked(state.redis(), &claims, user_id).await? {
        debug!(path = %path, user_id, "Auth failed: token revoked");
        return Err(AppError::InvalidToken);
    }

    let user = AuthenticatedUser {
        id: user_id,
        email: claims.email.clone(),
        role: claims.role.clone(),
        claims,
    };

    debug!(path = %path, user_id, role = %user.role, "User authenticated");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/events");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&request(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&request(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request(None)), None);
    }

    #[test]
    fn test_role_guards() {
        let user = |role: &str| AuthenticatedUser {
            id: 1,
            email: "a@b.c".into(),
            role: role.into(),
            claims: Claims {
                sub: "1".into(),
                email: "a@b.c".into(),
                role: role.into(),
                jti: "j".into(),
                exp: 0,
                iat: 0,
            },
        };

        assert!(user(roles::STUDENT).require_staff().is_err());
        assert!(user(roles::ORGANIZER).require_staff().is_ok());
        assert!(user(roles::ORGANIZER).require_admin().is_err());
        assert!(user(roles::ADMIN).require_admin().is_ok());
        assert_eq!(user(roles::ADMIN).actor().user_id, 1);
    }
}
