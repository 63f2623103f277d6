//! Event registration handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Registration routes; all of them need a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/event-registrations",
            get(handler::list_registrations).post(handler::create_registration),
        )
        .route(
            "/event-registrations/{id}",
            get(handler::get_registration)
                .put(handler::update_registration)
                .delete(handler::cancel_registration),
        )
        .route("/register", post(handler::register_self))
        .route("/qr/generate/{registration}", get(handler::generate_check_in_code))
}
