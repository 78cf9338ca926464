//! The backing store handle.
//!
//! A `Store` is constructed once at startup and cloned into every component.
//! It owns the PostgreSQL pool and the per-operation deadline.

use crate::domain::error::{LedgerError, LedgerResult};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Upper bound for one library operation, all of its statements included.
    pub deadline: Duration,
}

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
    deadline: Duration,
}

impl Store {
    /// Connects the pool and waits until the database answers.
    pub async fn connect(config: &StoreConfig) -> anyhow::Result<Self> {
        let pool = Self::pool_options(config)
            .connect_with(Self::connect_options(config)?)
            .await?;
        Ok(Self::from_pool(pool, config.deadline))
    }

    /// Builds the pool without opening any connection yet.
    pub fn connect_lazy(config: &StoreConfig) -> anyhow::Result<Self> {
        let pool = Self::pool_options(config).connect_lazy_with(Self::connect_options(config)?);
        Ok(Self::from_pool(pool, config.deadline))
    }

    pub fn from_pool(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn begin(&self) -> LedgerResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Runs one storage operation under the store deadline.
    ///
    /// On timeout the operation future is dropped, which rolls back any
    /// transaction it still holds open.
    pub async fn run<T, F>(&self, op: F) -> LedgerResult<T>
    where
        F: Future<Output = LedgerResult<T>>,
    {
        match tokio::time::timeout(self.deadline, op).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(deadline_ms = self.deadline.as_millis() as u64, "storage deadline exceeded");
                Err(LedgerError::DeadlineExceeded)
            }
        }
    }

    pub async fn ping(&self) -> LedgerResult<()> {
        self.run(async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok::<_, LedgerError>(())
        })
        .await
    }

    fn pool_options(config: &StoreConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(config.deadline)
    }

    fn connect_options(config: &StoreConfig) -> anyhow::Result<PgConnectOptions> {
        let statement_timeout = format!("{}ms", config.deadline.as_millis().max(1));
        Ok(PgConnectOptions::from_str(&config.database_url)?
            .options([("statement_timeout", statement_timeout.as_str())]))
    }
}
