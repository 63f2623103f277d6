//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod auth;
pub mod envelope;
pub mod events;
pub mod extract;
pub mod health;
pub mod leaderboard;
pub mod reference;
pub mod registrations;
pub mod users;

use axum::{Router, middleware};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .merge(health::routes())
        .merge(leaderboard::routes())
        .merge(reference::routes())
        .merge(auth::public_routes())
        .merge(events::public_routes());

    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(events::protected_routes())
        .merge(users::protected_routes())
        .merge(registrations::protected_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}
