//! Execution facade: runs statements through a [`DataAccess`] collaborator and
//! maps the rows.
//!
//! Every method renders the statement, validates placeholders against the
//! parameter set, runs the hooks and only then performs I/O. Build and bind
//! errors therefore never reach the collaborator.
//!
//! ```ignore
//! use fluentsql::{NamedSelect, Repository, SelectClauses, PageRequest};
//!
//! let repo = Repository::new(access);
//! let q = NamedSelect::of(|s| {
//!     s.select_from::<User>().and_where("age > :minAge");
//!     s.bind("minAge", 18);
//! });
//! let users: Vec<User> = repo.query_list(&q)?;
//! let page = repo.query_page::<User>(&q, PageRequest::new(2, 20)?)?;
//! ```

use crate::client::DataAccess;
use crate::config::{RepositoryConfig, SingleRowPolicy};
use crate::error::{SqlError, SqlResult};
use crate::mapper::{BeanMapper, MapMapper, RowMapper, SingleColumnMapper};
use crate::monitor::{HookAction, QueryContext, QueryHook, QueryResult};
use crate::paging::{self, Page, PageRequest};
use crate::params::{self, ParameterSet};
use crate::row::{FromRow, Row, RowMap};
use crate::statement::{Rendered, Statement};
use crate::value::FromValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Query facade over a [`DataAccess`] collaborator.
///
/// Stateless per call; shareable across threads whenever `D` is.
pub struct Repository<D> {
    access: D,
    config: RepositoryConfig,
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl<D: Clone> Clone for Repository<D> {
    fn clone(&self) -> Self {
        Self {
            access: self.access.clone(),
            config: self.config.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

impl<D> std::fmt::Debug for Repository<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("config", &self.config)
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

impl<D: DataAccess> Repository<D> {
    pub fn new(access: D) -> Self {
        Self {
            access,
            config: RepositoryConfig::default(),
            hooks: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: RepositoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a hook; hooks run in registration order.
    pub fn with_hook(mut self, hook: impl QueryHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn access(&self) -> &D {
        &self.access
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn into_access(self) -> D {
        self.access
    }

    // ==================== Execution core ====================

    fn context(&self, sql: &str, params: &ParameterSet) -> QueryContext {
        let ctx = QueryContext::new(sql, params.len());
        match &self.config.tag {
            Some(tag) => ctx.with_tag(tag.clone()),
            None => ctx,
        }
    }

    fn observe<T>(
        &self,
        ctx: &QueryContext,
        op: impl FnOnce() -> SqlResult<T>,
        summarize: impl FnOnce(&T) -> QueryResult,
    ) -> SqlResult<T> {
        for hook in &self.hooks {
            if let HookAction::Abort(reason) = hook.before_query(ctx) {
                return Err(SqlError::Aborted(reason));
            }
        }

        let start = Instant::now();
        let result = op();
        let elapsed = start.elapsed();

        self.report_slow(ctx, elapsed);

        if !self.hooks.is_empty() {
            let outcome = match &result {
                Ok(value) => summarize(value),
                Err(err) => QueryResult::error(err.to_string()),
            };
            for hook in &self.hooks {
                hook.after_query(ctx, elapsed, &outcome);
            }
        }
        result
    }

    fn report_slow(&self, ctx: &QueryContext, elapsed: Duration) {
        let Some(threshold) = self.config.slow_query_threshold else {
            return;
        };
        if elapsed >= threshold {
            tracing::warn!(
                target: "fluentsql.slow",
                query_type = ?ctx.query_type,
                tag = ctx.tag.as_deref().unwrap_or("-"),
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = threshold.as_millis() as u64,
                sql = %ctx.sql,
                "slow query"
            );
        }
    }

    fn fetch(&self, rendered: &Rendered) -> SqlResult<Vec<Row>> {
        params::validate(&rendered.sql, &rendered.params)?;
        let ctx = self.context(&rendered.sql, &rendered.params);
        self.observe(
            &ctx,
            || self.access.query(&rendered.sql, &rendered.params),
            |rows: &Vec<Row>| QueryResult::Rows(rows.len()),
        )
    }

    fn bounded(&self, statement: &(impl Statement + ?Sized), limit: u64, offset: u64) -> SqlResult<Rendered> {
        let base = statement.render_unbounded()?;
        Ok(Rendered::new(
            self.access.paginate(&base.sql, limit, offset),
            base.params,
        ))
    }

    fn map_rows<T>(rows: Vec<Row>, mapper: &impl RowMapper<T>) -> SqlResult<Vec<T>> {
        rows.iter().map(|row| mapper.map_row(row)).collect()
    }

    fn pick_one(&self, rows: Vec<Row>) -> SqlResult<Option<Row>> {
        if rows.len() > 1 && self.config.single_row == SingleRowPolicy::Strict {
            return Err(SqlError::too_many_rows(1, rows.len()));
        }
        Ok(rows.into_iter().next())
    }

    // ==================== Writes ====================

    /// Execute a write and return the affected row count.
    pub fn execute(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<u64> {
        let rendered = statement.render()?;
        params::validate(&rendered.sql, &rendered.params)?;
        let ctx = self.context(&rendered.sql, &rendered.params);
        self.observe(
            &ctx,
            || self.access.execute(&rendered.sql, &rendered.params),
            |n: &u64| QueryResult::Affected(*n),
        )
    }

    /// Execute one SQL template once per parameter set; returns per-set counts.
    ///
    /// Every set is validated before the first one is sent.
    pub fn execute_batch(&self, sql: &str, batch: &[ParameterSet]) -> SqlResult<Vec<u64>> {
        for set in batch {
            params::validate(sql, set)?;
        }
        let param_count = batch.first().map_or(0, ParameterSet::len);
        let mut ctx = QueryContext::new(sql, param_count);
        if let Some(tag) = &self.config.tag {
            ctx = ctx.with_tag(tag.clone());
        }
        self.observe(
            &ctx,
            || self.access.execute_batch(sql, batch),
            |counts: &Vec<u64>| QueryResult::Affected(counts.iter().sum()),
        )
    }

    /// Batch a built statement: it is rendered once and its SQL is run with
    /// each parameter set in turn. The statement's own parameters only shape
    /// the template and are not sent.
    pub fn execute_batch_statement(
        &self,
        statement: &(impl Statement + ?Sized),
        batch: &[ParameterSet],
    ) -> SqlResult<Vec<u64>> {
        let rendered = statement.render()?;
        self.execute_batch(&rendered.sql, batch)
    }

    // ==================== Lists ====================

    /// Run the statement and return its raw rows.
    pub fn query_rows(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Vec<Row>> {
        self.fetch(&statement.render()?)
    }

    /// All rows mapped with a custom mapper; empty when nothing matches.
    pub fn query_list_with<T>(
        &self,
        statement: &(impl Statement + ?Sized),
        mapper: impl RowMapper<T>,
    ) -> SqlResult<Vec<T>> {
        let rows = self.fetch(&statement.render()?)?;
        Self::map_rows(rows, &mapper)
    }

    /// At most `limit` rows mapped with a custom mapper.
    pub fn query_list_with_limit<T>(
        &self,
        statement: &(impl Statement + ?Sized),
        limit: u64,
        mapper: impl RowMapper<T>,
    ) -> SqlResult<Vec<T>> {
        self.query_list_with_range(statement, 0, limit, mapper)
    }

    /// `limit` rows starting at `offset`, mapped with a custom mapper.
    ///
    /// The statement's own LIMIT/OFFSET is replaced.
    pub fn query_list_with_range<T>(
        &self,
        statement: &(impl Statement + ?Sized),
        offset: u64,
        limit: u64,
        mapper: impl RowMapper<T>,
    ) -> SqlResult<Vec<T>> {
        let rows = self.fetch(&self.bounded(statement, limit, offset)?)?;
        Self::map_rows(rows, &mapper)
    }

    pub fn query_list<T: FromRow>(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Vec<T>> {
        self.query_list_with(statement, BeanMapper::<T>::new())
    }

    pub fn query_list_limit<T: FromRow>(
        &self,
        statement: &(impl Statement + ?Sized),
        limit: u64,
    ) -> SqlResult<Vec<T>> {
        self.query_list_with_limit(statement, limit, BeanMapper::<T>::new())
    }

    pub fn query_list_range<T: FromRow>(
        &self,
        statement: &(impl Statement + ?Sized),
        offset: u64,
        limit: u64,
    ) -> SqlResult<Vec<T>> {
        self.query_list_with_range(statement, offset, limit, BeanMapper::<T>::new())
    }

    /// First column of every row.
    pub fn query_list_single<T: FromValue>(
        &self,
        statement: &(impl Statement + ?Sized),
    ) -> SqlResult<Vec<T>> {
        self.query_list_with(statement, SingleColumnMapper::<T>::new())
    }

    pub fn query_list_single_limit<T: FromValue>(
        &self,
        statement: &(impl Statement + ?Sized),
        limit: u64,
    ) -> SqlResult<Vec<T>> {
        self.query_list_with_limit(statement, limit, SingleColumnMapper::<T>::new())
    }

    pub fn query_list_single_range<T: FromValue>(
        &self,
        statement: &(impl Statement + ?Sized),
        offset: u64,
        limit: u64,
    ) -> SqlResult<Vec<T>> {
        self.query_list_with_range(statement, offset, limit, SingleColumnMapper::<T>::new())
    }

    /// One ordered column map per row.
    pub fn query_list_map(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Vec<RowMap>> {
        self.query_list_with(statement, MapMapper)
    }

    pub fn query_list_map_limit(
        &self,
        statement: &(impl Statement + ?Sized),
        limit: u64,
    ) -> SqlResult<Vec<RowMap>> {
        self.query_list_with_limit(statement, limit, MapMapper)
    }

    pub fn query_list_map_range(
        &self,
        statement: &(impl Statement + ?Sized),
        offset: u64,
        limit: u64,
    ) -> SqlResult<Vec<RowMap>> {
        self.query_list_with_range(statement, offset, limit, MapMapper)
    }

    // ==================== Single objects ====================

    /// At most one mapped row; `None` when nothing matches.
    ///
    /// More than one row follows the configured [`SingleRowPolicy`].
    pub fn query_object_with<T>(
        &self,
        statement: &(impl Statement + ?Sized),
        mapper: impl RowMapper<T>,
    ) -> SqlResult<Option<T>> {
        let rows = self.fetch(&statement.render()?)?;
        match self.pick_one(rows)? {
            Some(row) => mapper.map_row(&row).map(Some),
            None => Ok(None),
        }
    }

    pub fn query_object<T: FromRow>(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<T>> {
        self.query_object_with(statement, BeanMapper::<T>::new())
    }

    pub fn query_object_single<T: FromValue>(
        &self,
        statement: &(impl Statement + ?Sized),
    ) -> SqlResult<Option<T>> {
        self.query_object_with(statement, SingleColumnMapper::<T>::new())
    }

    pub fn query_object_map(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<RowMap>> {
        self.query_object_with(statement, MapMapper)
    }

    // ==================== Pages ====================

    /// One page mapped with a custom mapper.
    ///
    /// Runs the derived count statement, then the bounded statement. The
    /// bounded statement runs even when the count is zero.
    pub fn query_page_with<T>(
        &self,
        statement: &(impl Statement + ?Sized),
        request: PageRequest,
        mapper: impl RowMapper<T>,
    ) -> SqlResult<Page<T>> {
        let plan = paging::plan(statement, request, &self.access)?;
        params::validate(&plan.count.sql, &plan.count.params)?;
        params::validate(&plan.bounded.sql, &plan.bounded.params)?;

        let total = paging::read_total(&self.fetch(&plan.count)?)?;
        let rows = self.fetch(&plan.bounded)?;
        let content = Self::map_rows(rows, &mapper)?;
        Ok(Page::new(content, total, request))
    }

    pub fn query_page<T: FromRow>(
        &self,
        statement: &(impl Statement + ?Sized),
        request: PageRequest,
    ) -> SqlResult<Page<T>> {
        self.query_page_with(statement, request, BeanMapper::<T>::new())
    }

    pub fn query_page_single<T: FromValue>(
        &self,
        statement: &(impl Statement + ?Sized),
        request: PageRequest,
    ) -> SqlResult<Page<T>> {
        self.query_page_with(statement, request, SingleColumnMapper::<T>::new())
    }

    pub fn query_page_map(
        &self,
        statement: &(impl Statement + ?Sized),
        request: PageRequest,
    ) -> SqlResult<Page<RowMap>> {
        self.query_page_with(statement, request, MapMapper)
    }

    // ==================== Scalars ====================

    /// First column of the first row; `None` for no row or NULL.
    pub fn query_scalar<T: FromValue>(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<T>> {
        Ok(self
            .query_object_with(statement, SingleColumnMapper::<Option<T>>::new())?
            .flatten())
    }

    pub fn query_long(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<i64>> {
        self.query_scalar(statement)
    }

    pub fn query_int(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<i32>> {
        self.query_scalar(statement)
    }

    pub fn query_short(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<i16>> {
        self.query_scalar(statement)
    }

    pub fn query_string(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<String>> {
        self.query_scalar(statement)
    }

    pub fn query_boolean(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<bool>> {
        self.query_scalar(statement)
    }

    pub fn query_double(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<f64>> {
        self.query_scalar(statement)
    }

    pub fn query_float(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<f32>> {
        self.query_scalar(statement)
    }

    pub fn query_date(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<NaiveDate>> {
        self.query_scalar(statement)
    }

    pub fn query_time(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<NaiveTime>> {
        self.query_scalar(statement)
    }

    pub fn query_timestamp(
        &self,
        statement: &(impl Statement + ?Sized),
    ) -> SqlResult<Option<NaiveDateTime>> {
        self.query_scalar(statement)
    }

    pub fn query_timestamp_tz(
        &self,
        statement: &(impl Statement + ?Sized),
    ) -> SqlResult<Option<DateTime<Utc>>> {
        self.query_scalar(statement)
    }

    pub fn query_uuid(&self, statement: &(impl Statement + ?Sized)) -> SqlResult<Option<Uuid>> {
        self.query_scalar(statement)
    }

    pub fn query_json(
        &self,
        statement: &(impl Statement + ?Sized),
    ) -> SqlResult<Option<serde_json::Value>> {
        self.query_scalar(statement)
    }
}
