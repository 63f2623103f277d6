//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::{
    config::Config,
    db::PgRegistrationGateway,
    services::RegistrationEngine,
    utils::SystemClock,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Database connection pool
    db: PgPool,

    /// Redis connection manager
    redis: ConnectionManager,

    /// Registration rules over the Postgres gateway
    registrations: RegistrationEngine,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(db: PgPool, redis: ConnectionManager, config: Config) -> Self {
        let registrations = RegistrationEngine::new(
            Arc::new(PgRegistrationGateway::new(db.clone())),
            Arc::new(SystemClock),
        )
        .with_cancellation_cutoff(config.registration.cancellation_cutoff());

        Self {
            inner: Arc::new(AppStateInner {
                db,
                redis,
                registrations,
                config,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a clone of the Redis connection manager
    pub fn redis(&self) -> ConnectionManager {
        self.inner.redis.clone()
    }

    /// Get the registration engine
    pub fn registrations(&self) -> &RegistrationEngine {
        &self.inner.registrations
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
