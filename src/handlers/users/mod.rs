//! User management handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

/// User routes; all of them need a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handler::list_users).post(handler::create_user))
        .route(
            "/users/{id}",
            get(handler::get_user)
                .put(handler::update_user)
                .delete(handler::delete_user),
        )
        .route("/users-statistics", get(handler::user_statistics))
        .route("/users/{id}/profile", get(handler::user_profile))
        .route("/users/{id}/password", put(handler::update_password))
        .route("/users/{id}/registrations", get(handler::list_user_registrations))
}
