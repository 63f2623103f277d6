//! Health check handlers

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::{db, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub redis: &'static str,
    pub version: &'static str,
}

fn component(ok: bool) -> &'static str {
    if ok { "up" } else { "down" }
}

/// Health check endpoint; 503 when a backing service is unreachable
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match db::ping(state.db()).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            false
        }
    };

    let mut redis = state.redis();
    let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut redis).await;
    let redis = match pong {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: redis unreachable");
            false
        }
    };

    let healthy = database && redis;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "degraded" },
            database: component(database),
            redis: component(redis),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
