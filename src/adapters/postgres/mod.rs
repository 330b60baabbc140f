//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSessionRepository` - Sessions and attendee records
//!
//! Schema lives in `migrations/` and is applied with [`run_migrations`].

mod session_repository;

pub use session_repository::PostgresSessionRepository;

use sqlx::PgPool;

/// Applies pending migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
