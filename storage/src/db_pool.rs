//! Connection pool wrapper for the storage crate.

use std::time::Duration;

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;
use tracing::{error, info};

use crate::dialect::SqlDialect;
use crate::error::StorageError;

/// Pool sizing and acquisition bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Owns one pool; statements auto-commit (no explicit transactions are opened).
#[derive(Clone)]
pub struct DbPoolManager {
    pool: AnyPool,
    dialect: SqlDialect,
}

impl DbPoolManager {
    /// Connects a pool for `database_url` and runs the liveness check.
    /// The pool is closed again if the check fails.
    pub async fn new(database_url: &str, settings: &PoolSettings) -> Result<Self, StorageError> {
        let dialect = SqlDialect::from_url(database_url)?;
        install_default_drivers();

        info!(
            backend = dialect.name(),
            min_connections = settings.min_connections,
            max_connections = settings.max_connections,
            "Initializing database pool"
        );

        let pool = AnyPoolOptions::new()
            .min_connections(settings.min_connections)
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect(database_url)
            .await
            .map_err(StorageError::Connect)?;

        let manager = Self { pool, dialect };
        if let Err(e) = manager.check_liveness().await {
            error!(error = %e, "Database liveness check failed");
            manager.close().await;
            return Err(e);
        }

        Ok(manager)
    }

    /// Round-trips `SELECT 1`; anything but 1 is a failure.
    pub async fn check_liveness(&self) -> Result<(), StorageError> {
        let value: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Connect)?;

        if value != 1 {
            return Err(StorageError::LivenessCheck(value));
        }
        Ok(())
    }

    /// Returns the underlying pool for running queries.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Closes the pool and waits until every checked-out connection has been returned and closed.
    pub async fn close(&self) {
        info!(backend = self.dialect.name(), "Closing database pool");
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
