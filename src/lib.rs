//! EventMaster - College Event Management API
//!
//! Organizers publish events, students register for them, and the platform
//! tracks attendance, feedback and points for a leaderboard.
//!
//! # Registration rules
//!
//! - One registration per event and user
//! - Capacity counts `pending` and `confirmed` registrations only
//! - No registration once the event has started
//! - No cancellation within the cutoff window before the start
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic, including the registration engine
//! - **Repositories**: Database access, plus the registration gateway
//! - **Models**: Domain models and DTOs

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
