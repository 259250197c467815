//! The seam between statement producers and the repository.

use crate::error::SqlResult;
use crate::params::{BoundValue, ParameterSet};

/// SQL text with the parameters it is executed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub sql: String,
    pub params: ParameterSet,
}

impl Rendered {
    pub fn new(sql: impl Into<String>, params: ParameterSet) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Anything the repository can execute.
///
/// Builders implement all three renderings; raw SQL uses the defaults, so its
/// count query wraps the original statement in a subquery.
pub trait Statement {
    /// The statement as written, LIMIT/OFFSET included.
    fn render(&self) -> SqlResult<Rendered>;

    /// The statement without its own LIMIT/OFFSET, used as the base of a page.
    fn render_unbounded(&self) -> SqlResult<Rendered> {
        self.render()
    }

    /// `COUNT(*)` over the unbounded statement.
    fn render_count(&self) -> SqlResult<Rendered> {
        let base = self.render_unbounded()?;
        Ok(Rendered::new(
            format!("SELECT COUNT(*) FROM ({}) AS t", base.sql),
            base.params,
        ))
    }
}

impl<S: Statement + ?Sized> Statement for &S {
    fn render(&self) -> SqlResult<Rendered> {
        (**self).render()
    }

    fn render_unbounded(&self) -> SqlResult<Rendered> {
        (**self).render_unbounded()
    }

    fn render_count(&self) -> SqlResult<Rendered> {
        (**self).render_count()
    }
}

/// Plain SQL without parameters.
impl Statement for str {
    fn render(&self) -> SqlResult<Rendered> {
        Ok(Rendered::new(self, ParameterSet::indexed()))
    }
}

impl Statement for String {
    fn render(&self) -> SqlResult<Rendered> {
        self.as_str().render()
    }
}

/// Hand-written SQL with its parameters.
///
/// ```ignore
/// use fluentsql::RawSql;
///
/// let q = RawSql::named("SELECT * FROM users WHERE id = :id").bind("id", 7_i64);
/// let q = RawSql::indexed("SELECT * FROM users WHERE id = ?", [7_i64]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RawSql {
    sql: String,
    params: ParameterSet,
}

impl RawSql {
    /// SQL with an empty indexed parameter set.
    pub fn new(sql: impl Into<String>) -> Self {
        Self::with_params(sql, ParameterSet::indexed())
    }

    pub fn with_params(sql: impl Into<String>, params: ParameterSet) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// SQL using `:name` placeholders; bind values with [`bind`](Self::bind).
    pub fn named(sql: impl Into<String>) -> Self {
        Self::with_params(sql, ParameterSet::named())
    }

    /// SQL using `?` placeholders with values in placeholder order.
    pub fn indexed<I>(sql: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        Self::with_params(
            sql,
            ParameterSet::Indexed(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn bind(mut self, name: &str, value: impl Into<BoundValue>) -> Self {
        self.params.insert(name, value.into());
        self
    }

    pub fn push(mut self, value: impl Into<BoundValue>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }
}

impl Statement for RawSql {
    fn render(&self) -> SqlResult<Rendered> {
        Ok(Rendered::new(self.sql.clone(), self.params.clone()))
    }
}
