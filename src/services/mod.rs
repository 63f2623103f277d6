//! Business logic services

pub mod auth_service;
pub mod event_service;
pub mod points_service;
pub mod registration_report_service;
pub mod registration_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use event_service::EventService;
pub use points_service::PointsService;
pub use registration_report_service::RegistrationReportService;
pub use registration_service::RegistrationEngine;
pub use user_service::UserService;
