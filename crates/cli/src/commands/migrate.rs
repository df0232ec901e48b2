//! Database migration command.
//!
//! Runs the workspace migrations in `migrations/` and then the
//! tower-sessions table migration (both services use the same sessions
//! table). Migrations never run on service startup; this command is the
//! only place they happen.
//!
//! ```bash
//! puffshop migrate
//! ```

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run all migrations against the shared database.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("Creating sessions table...");
    let session_store = PostgresStore::new(pool);
    session_store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
