use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::config::AppConfig;

/// Failures reported by repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A uniqueness rule or write precondition rejected the statement.
    #[error("conflicting write")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored value could not be mapped back into the domain.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

pub async fn migrate(db: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }
}

/// Maps a unique-constraint violation to `RepoError::Conflict`.
pub(crate) fn conflict_on_unique(e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Conflict,
        _ => RepoError::Database(e),
    }
}
