//! SQLite toggle store built on an `sqlx` pool.

use super::{ConnectionFactory, RecordState, TOGGLE_TABLE, ToggleConnection, ToggleRecord};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Connection settings for the SQLite toggle store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Database URL, e.g. `sqlite://toggles.db?mode=rwc`.
    pub database_url: String,

    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl SqliteStoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = timeout.as_secs();
        self
    }
}

/// Hands out pooled SQLite connections; each returns to the pool on drop.
#[derive(Debug, Clone)]
pub struct SqliteConnectionFactory {
    pool: SqlitePool,
}

impl SqliteConnectionFactory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool from configuration.
    pub async fn connect_with(config: &SqliteStoreConfig) -> StoreResult<Self> {
        info!(max_connections = config.max_connections, "Creating SQLite toggle store pool");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the toggle table if it does not exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {TOGGLE_TABLE} (\
                Id INTEGER PRIMARY KEY AUTOINCREMENT, \
                Name TEXT NOT NULL UNIQUE, \
                State INTEGER NOT NULL DEFAULT 0)"
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ConnectionFactory for SqliteConnectionFactory {
    async fn connect(&self, cancel: &CancellationToken) -> StoreResult<Box<dyn ToggleConnection>> {
        tokio::select! {
            _ = cancel.cancelled() => Err(StoreError::Cancelled),
            connection = self.pool.acquire() => {
                debug!("Acquired SQLite toggle store connection");
                let connection: Box<dyn ToggleConnection> =
                    Box::new(SqliteToggleConnection { connection: connection? });
                Ok(connection)
            }
        }
    }
}

struct SqliteToggleConnection {
    connection: PoolConnection<Sqlite>,
}

type RecordRow = (i64, String, i64);

fn into_record((id, name, state): RecordRow) -> ToggleRecord {
    ToggleRecord::new(id, name, RecordState::from_i64(state))
}

#[async_trait]
impl ToggleConnection for SqliteToggleConnection {
    async fn find_by_name(&mut self, name: &str) -> StoreResult<Option<ToggleRecord>> {
        let sql = format!("SELECT Id, Name, State FROM {TOGGLE_TABLE} WHERE Name = ? LIMIT 1");
        let row: Option<RecordRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&mut *self.connection)
            .await?;

        Ok(row.map(into_record))
    }

    async fn fetch_all(&mut self) -> StoreResult<Vec<ToggleRecord>> {
        let sql = format!("SELECT Id, Name, State FROM {TOGGLE_TABLE} WHERE Name IS NOT NULL");
        let rows: Vec<RecordRow> = sqlx::query_as(&sql)
            .fetch_all(&mut *self.connection)
            .await?;

        Ok(rows.into_iter().map(into_record).collect())
    }
}
