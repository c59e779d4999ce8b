//! Database layer for Roster
//!
//! SQLite-backed implementations of the [`Directory`](roster_core::Directory)
//! and [`PullRequestStore`](roster_core::PullRequestStore) collaborators.

pub mod error;
pub mod repos;

use std::path::Path;
use std::str::FromStr;

use roster_core::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

pub use error::{Error, Result};
pub use repos::{PullRequestRepository, TeamRepository};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `db_path` and run migrations
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(&DatabaseConfig {
            path: db_path.as_ref().to_path_buf(),
            ..DatabaseConfig::default()
        })
        .await
    }

    /// Connect with the given configuration and run migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        // Create parent directory if needed
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path.display()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        tracing::debug!(path = %config.path.display(), "Database ready");
        Ok(db)
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the team and user repository
    pub fn teams(&self) -> TeamRepository {
        TeamRepository::new(self.pool.clone())
    }

    /// Get the pull request repository
    pub fn pull_requests(&self) -> PullRequestRepository {
        PullRequestRepository::new(self.pool.clone())
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}
