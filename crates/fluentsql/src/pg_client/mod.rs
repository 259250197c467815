//! PostgreSQL [`DataAccess`] adapter over tokio-postgres.
//!
//! `PgAccess` owns one connection and a private single-worker tokio runtime,
//! and blocks the calling thread on each request. `?` and `:name` placeholders
//! are rewritten to `$n` before the statement is sent.
//!
//! ```ignore
//! use fluentsql::pg_client::PgAccess;
//! use fluentsql::Repository;
//!
//! let repo = Repository::new(PgAccess::from_env()?);
//! let n = repo.query_long("SELECT COUNT(*) FROM users")?;
//! ```

mod config;
mod value;

#[cfg(test)]
mod tests;

pub use config::PgAccessConfig;

use crate::client::DataAccess;
use crate::error::{SqlError, SqlResult};
use crate::params::{self, BoundValue, ParameterSet};
use crate::row::Row;
use tokio::runtime::Runtime;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};

/// Blocking PostgreSQL access for the [`Repository`](crate::Repository).
pub struct PgAccess {
    client: Client,
    runtime: Runtime,
}

impl std::fmt::Debug for PgAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgAccess")
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

fn as_params(values: &[BoundValue]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl PgAccess {
    pub fn connect(url: &str) -> SqlResult<Self> {
        Self::connect_with(PgAccessConfig::new(url))
    }

    /// Connect using `DATABASE_URL`.
    pub fn from_env() -> SqlResult<Self> {
        Self::connect_with(PgAccessConfig::from_env()?)
    }

    pub fn connect_with(config: PgAccessConfig) -> SqlResult<Self> {
        let pg_config = config.to_pg_config()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("fluentsql-pg")
            .enable_all()
            .build()
            .map_err(|e| SqlError::Connection(e.to_string()))?;

        let (client, connection) = runtime
            .block_on(pg_config.connect(NoTls))
            .map_err(|e| SqlError::Connection(e.to_string()))?;

        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "fluentsql.pg", error = %e, "connection error");
            }
        });

        tracing::debug!(
            target: "fluentsql.pg",
            application_name = config.application_name.as_deref().unwrap_or("-"),
            "connected"
        );
        Ok(Self { client, runtime })
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }
}

impl DataAccess for PgAccess {
    fn execute(&self, sql: &str, params: &ParameterSet) -> SqlResult<u64> {
        let (sql, values) = params::to_numbered(sql, params)?;
        self.runtime
            .block_on(self.client.execute(sql.as_str(), &as_params(&values)))
            .map_err(SqlError::from_db_error)
    }

    fn query(&self, sql: &str, params: &ParameterSet) -> SqlResult<Vec<Row>> {
        let (sql, values) = params::to_numbered(sql, params)?;
        let rows = self
            .runtime
            .block_on(self.client.query(sql.as_str(), &as_params(&values)))
            .map_err(SqlError::from_db_error)?;
        value::convert_rows(rows)
    }

    /// Prepares the template once and executes it for every set.
    fn execute_batch(&self, sql: &str, batch: &[ParameterSet]) -> SqlResult<Vec<u64>> {
        let Some(first) = batch.first() else {
            return Ok(Vec::new());
        };
        let (numbered, _) = params::to_numbered(sql, first)?;
        self.runtime.block_on(async {
            let statement = self
                .client
                .prepare(&numbered)
                .await
                .map_err(SqlError::from_db_error)?;
            let mut counts = Vec::with_capacity(batch.len());
            for set in batch {
                let (_, values) = params::to_numbered(sql, set)?;
                let n = self
                    .client
                    .execute(&statement, &as_params(&values))
                    .await
                    .map_err(SqlError::from_db_error)?;
                counts.push(n);
            }
            Ok::<_, SqlError>(counts)
        })
    }
}
