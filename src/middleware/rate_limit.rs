//! Rate limiting middleware

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use redis::AsyncCommands;

use crate::{constants::rate_limits, error::AppError, state::AppState};

/// Fixed-window counter per client IP and endpoint bucket.
///
/// Redis failures let the request through.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bucket = path_bucket(request.uri().path());
    let (limit, window) = rate_limit_for(bucket);

    let key = format!("rate_limit:{}:{}", addr.ip(), bucket);
    let mut redis = state.redis();

    let count: i64 = match redis.incr(&key, 1).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "Rate limiter unavailable");
            return Ok(next.run(request).await);
        }
    };

    if count == 1 {
        if let Err(e) = redis.expire::<_, ()>(&key, window).await {
            tracing::warn!(error = %e, key = %key, "Failed to set rate limit window");
        }
    }

    if count > limit {
        tracing::debug!(ip = %addr.ip(), bucket, count, "Rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(request).await)
}

/// Bucket for path (groups similar endpoints)
fn path_bucket(path: &str) -> &'static str {
    let path = path.strip_prefix(crate::constants::API_BASE_PATH).unwrap_or(path);
    if path.starts_with("/auth/login") || path.starts_with("/auth/register") {
        "auth"
    } else if path.starts_with("/event-registrations") || path.starts_with("/register") {
        "registrations"
    } else {
        "general"
    }
}

fn rate_limit_for(bucket: &str) -> (i64, i64) {
    match bucket {
        "auth" => (rate_limits::AUTH_MAX_REQUESTS, rate_limits::AUTH_WINDOW_SECS),
        "registrations" => (
            rate_limits::REGISTRATION_MAX_REQUESTS,
            rate_limits::REGISTRATION_WINDOW_SECS,
        ),
        _ => (rate_limits::GENERAL_MAX_REQUESTS, rate_limits::GENERAL_WINDOW_SECS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_bucket() {
        assert_eq!(path_bucket("/api/auth/login"), "auth");
        assert_eq!(path_bucket("/api/auth/profile"), "general");
        assert_eq!(path_bucket("/api/event-registrations/3"), "registrations");
        assert_eq!(path_bucket("/api/register"), "registrations");
        assert_eq!(path_bucket("/api/events"), "general");
    }
}
