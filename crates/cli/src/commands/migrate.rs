//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! craftline migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! Migration files live in `crates/admin/migrations/`.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::{CommandError, database_url};

/// Run the admin database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to admin database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
