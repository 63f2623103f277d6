//! Database module
//!
//! Connections, migrations, the registration gateway and read-side repositories.

pub mod connection;
pub mod gateway;
pub mod memory;
pub mod repositories;

use sqlx::PgPool;

pub use connection::*;
pub use gateway::RegistrationGateway;
pub use memory::InMemoryGateway;
pub use repositories::PgRegistrationGateway;

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
