//! Video metadata persistence.
//!
//! The ingest pipeline only ever reads a record and overwrites its
//! `video_url` field; everything else here is plain CRUD.

pub mod videos;

pub use videos::{PgVideoRepository, VideoRepository};

use clipvault_core::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Connect to Postgres with the workspace's default pool settings.
pub async fn connect(database_url: &str) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(std::time::Duration::from_secs(CONNECTION_TIMEOUT_SECS))
        .connect(database_url)
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))
}

/// Run embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

    tracing::info!("Database migrations applied");
    Ok(())
}
