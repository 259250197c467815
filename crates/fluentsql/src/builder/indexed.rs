use super::clause::{Fragment, JoinKind};
use super::mode::Indexed;
use super::select::{SelectClauses, SelectStatement, Section, Shape};
use crate::error::SqlResult;
use crate::params::{BoundValue, ParameterSet};
use crate::statement::{Rendered, Statement};

/// SELECT builder with `?` placeholders.
///
/// Values are attached to the clause that contains their `?`, so the final
/// parameter list always follows the rendered placeholder order.
///
/// ```ignore
/// use fluentsql::{IndexedSelect, SelectClauses};
///
/// let mut q = IndexedSelect::new();
/// q.from(&["users"]).and_where_bind("id = ?", [1]).and_where_bind("id = ?", [2]);
/// assert_eq!(q.to_sql(), "SELECT * FROM users WHERE id = ? AND id = ?");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedSelect {
    inner: SelectStatement,
}

fn fragment<I>(sql: &str, values: I) -> Fragment
where
    I: IntoIterator,
    I::Item: Into<BoundValue>,
{
    Fragment::new(sql, values.into_iter().map(Into::into).collect())
}

impl IndexedSelect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder and configure it in a callback.
    pub fn of<F: FnOnce(&mut Self)>(f: F) -> Self {
        let mut builder = Self::new();
        f(&mut builder);
        builder
    }

    /// Append a SELECT expression with `?` placeholders.
    pub fn select_bind<I>(&mut self, expr: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        self.inner
            .push::<Indexed>(Section::Select, fragment(expr, values));
        self
    }

    /// Append a join whose ON clause contains `?` placeholders.
    pub fn join_bind<I>(&mut self, kind: JoinKind, target: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        self.inner
            .push_join::<Indexed>(kind, fragment(target, values));
        self
    }

    /// AND a WHERE condition together with the values for its `?`s.
    ///
    /// A count mismatch records a build error and leaves the statement unchanged.
    pub fn and_where_bind<I>(&mut self, condition: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        self.inner
            .push::<Indexed>(Section::Where, fragment(condition, values));
        self
    }

    /// AND a HAVING condition together with the values for its `?`s.
    pub fn having_bind<I>(&mut self, condition: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        self.inner
            .push::<Indexed>(Section::Having, fragment(condition, values));
        self
    }

    /// Current positional parameters, in rendered order.
    pub fn parameters(&self) -> ParameterSet {
        ParameterSet::Indexed(self.inner.render_shape(Shape::Full).1)
    }
}

impl SelectClauses for IndexedSelect {
    type Mode = Indexed;

    fn statement(&self) -> &SelectStatement {
        &self.inner
    }

    fn statement_mut(&mut self) -> &mut SelectStatement {
        &mut self.inner
    }
}

impl Statement for IndexedSelect {
    fn render(&self) -> SqlResult<Rendered> {
        self.inner.render::<Indexed>(Shape::Full)
    }

    fn render_unbounded(&self) -> SqlResult<Rendered> {
        self.inner.render::<Indexed>(Shape::Unbounded)
    }

    fn render_count(&self) -> SqlResult<Rendered> {
        self.inner.render::<Indexed>(Shape::Count)
    }
}
