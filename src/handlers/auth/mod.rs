//! Authentication handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Registration and login
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handler::register))
        .route("/auth/login", post(handler::login))
}

/// Session and own-profile routes
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(handler::logout))
        .route("/auth/logout-all", post(handler::logout_all))
        .route("/auth/profile", get(handler::profile).put(handler::update_profile))
        .route("/auth/change-password", put(handler::change_password))
}
