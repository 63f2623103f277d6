//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod event_repo;
pub mod points_repo;
pub mod reference_repo;
pub mod registration_repo;
pub mod user_repo;

pub use event_repo::{EventFields, EventFilter, EventRepository};
pub use points_repo::PointsRepository;
pub use reference_repo::{ReferenceData, ReferenceRepository};
pub use registration_repo::{PgRegistrationGateway, RegistrationFilter, RegistrationRepository};
pub use user_repo::{NewUser, UserChanges, UserFilter, UserRepository};
