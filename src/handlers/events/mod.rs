//! Event handlers

mod handler;
pub mod request;

pub use handler::*;
pub use request::*;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Event routes open to anonymous callers
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(handler::list_events))
        .route("/events/{id}", get(handler::get_event))
        .route("/events-statistics", get(handler::event_statistics))
}

/// Event routes that need a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(handler::create_event))
        .route("/events/{id}", put(handler::update_event).delete(handler::delete_event))
        .route("/events/{id}/registrations", get(handler::list_event_registrations))
}
