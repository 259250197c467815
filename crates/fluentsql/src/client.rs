//! Data-access collaborator seam.

use crate::error::SqlResult;
use crate::params::ParameterSet;
use crate::row::Row;
use std::sync::Arc;

/// The connection/transaction side of the repository.
///
/// Implementations receive SQL exactly as rendered by the builders (`:name` or
/// `?` placeholders) together with its [`ParameterSet`], and are responsible for
/// translating both into whatever their driver expects. Statements and their
/// parameters are validated by the repository before they get here.
pub trait DataAccess: Send + Sync {
    /// Execute a write and return the number of affected rows.
    fn execute(&self, sql: &str, params: &ParameterSet) -> SqlResult<u64>;

    /// Run a query and return all rows in result order.
    fn query(&self, sql: &str, params: &ParameterSet) -> SqlResult<Vec<Row>>;

    /// Execute one SQL template once per parameter set.
    ///
    /// The default implementation runs the sets one after another and stops at
    /// the first failure.
    fn execute_batch(&self, sql: &str, batch: &[ParameterSet]) -> SqlResult<Vec<u64>> {
        batch
            .iter()
            .map(|params| self.execute(sql, params))
            .collect()
    }

    /// Append a LIMIT/OFFSET bound to `sql` in this database's syntax.
    fn paginate(&self, sql: &str, limit: u64, offset: u64) -> String {
        format!("{} LIMIT {} OFFSET {}", sql, limit, offset)
    }
}

impl<D: DataAccess + ?Sized> DataAccess for &D {
    fn execute(&self, sql: &str, params: &ParameterSet) -> SqlResult<u64> {
        (**self).execute(sql, params)
    }

    fn query(&self, sql: &str, params: &ParameterSet) -> SqlResult<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn execute_batch(&self, sql: &str, batch: &[ParameterSet]) -> SqlResult<Vec<u64>> {
        (**self).execute_batch(sql, batch)
    }

    fn paginate(&self, sql: &str, limit: u64, offset: u64) -> String {
        (**self).paginate(sql, limit, offset)
    }
}

impl<D: DataAccess + ?Sized> DataAccess for Arc<D> {
    fn execute(&self, sql: &str, params: &ParameterSet) -> SqlResult<u64> {
        (**self).execute(sql, params)
    }

    fn query(&self, sql: &str, params: &ParameterSet) -> SqlResult<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn execute_batch(&self, sql: &str, batch: &[ParameterSet]) -> SqlResult<Vec<u64>> {
        (**self).execute_batch(sql, batch)
    }

    fn paginate(&self, sql: &str, limit: u64, offset: u64) -> String {
        (**self).paginate(sql, limit, offset)
    }
}
