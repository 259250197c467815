use super::clause::Fragment;
use super::mode::Named;
use super::select::{SelectClauses, SelectStatement, Section, Shape};
use crate::error::SqlResult;
use crate::params::{BoundValue, ParameterSet};
use crate::statement::{Rendered, Statement};
use crate::value::ValueKind;

/// SELECT builder with `:name` placeholders.
///
/// ```ignore
/// use fluentsql::{NamedSelect, SelectClauses};
///
/// let q = NamedSelect::of(|s| {
///     s.select(&["id", "name"]).from(&["users"]).and_where("age > :minAge");
///     s.bind("minAge", 18);
/// });
/// assert_eq!(q.to_sql(), "SELECT id, name FROM users WHERE age > :minAge");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedSelect {
    inner: SelectStatement,
}

impl NamedSelect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder and configure it in a callback.
    pub fn of<F: FnOnce(&mut Self)>(f: F) -> Self {
        let mut builder = Self::new();
        f(&mut builder);
        builder
    }

    /// Bind a value to `:name`. The last write for a name wins.
    pub fn bind(&mut self, name: &str, value: impl Into<BoundValue>) -> &mut Self {
        self.inner.bind(name, value.into());
        self
    }

    /// Bind a NULL with an explicit type.
    pub fn bind_null(&mut self, name: &str, kind: ValueKind) -> &mut Self {
        self.bind(name, BoundValue::null(kind))
    }

    /// AND a WHERE condition and bind its parameters in the same call.
    pub fn and_where_bind<I, K, V>(&mut self, condition: &str, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<BoundValue>,
    {
        for (name, value) in params {
            self.inner.bind(name.as_ref(), value.into());
        }
        self.inner
            .push::<Named>(Section::Where, Fragment::raw(condition));
        self
    }

    /// AND a HAVING condition and bind its parameters in the same call.
    pub fn having_bind<I, K, V>(&mut self, condition: &str, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<BoundValue>,
    {
        for (name, value) in params {
            self.inner.bind(name.as_ref(), value.into());
        }
        self.inner
            .push::<Named>(Section::Having, Fragment::raw(condition));
        self
    }

    /// Current named parameters.
    pub fn parameters(&self) -> ParameterSet {
        ParameterSet::Named(self.inner.named_params().clone())
    }
}

impl SelectClauses for NamedSelect {
    type Mode = Named;

    fn statement(&self) -> &SelectStatement {
        &self.inner
    }

    fn statement_mut(&mut self) -> &mut SelectStatement {
        &mut self.inner
    }
}

impl Statement for NamedSelect {
    fn render(&self) -> SqlResult<Rendered> {
        self.inner.render::<Named>(Shape::Full)
    }

    fn render_unbounded(&self) -> SqlResult<Rendered> {
        self.inner.render::<Named>(Shape::Unbounded)
    }

    fn render_count(&self) -> SqlResult<Rendered> {
        self.inner.render::<Named>(Shape::Count)
    }
}
