use super::clause::{Fragment, push_list};
use super::mode::{self, BindMode, Indexed, Named};
use super::predicate::Predicate;
use super::where_clause::WhereClause;
use crate::entity::Entity;
use crate::error::{SqlError, SqlResult};
use crate::params::BoundValue;
use crate::statement::{Rendered, Statement};
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

/// UPDATE builder.
///
/// Requires at least one SET column, and a WHERE condition unless
/// [`allow_all`](Self::allow_all) was called.
///
/// In named mode SET values and `and_eq` values share one name space; a column
/// that is both SET and filtered gets a suffixed second name (`:status_1`).
/// Binding a name by hand that a SET already uses with a different value is a
/// build error.
#[derive(Debug, Clone)]
pub struct UpdateSql<M: BindMode> {
    table: String,
    sets: Vec<Fragment>,
    named: BTreeMap<String, BoundValue>,
    filter: WhereClause<M>,
    allow_all: bool,
    _mode: PhantomData<M>,
}

impl<M: BindMode> UpdateSql<M> {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            sets: Vec::new(),
            named: BTreeMap::new(),
            filter: WhereClause::new(),
            allow_all: false,
            _mode: PhantomData,
        }
    }

    /// Update the table of `T`.
    pub fn entity<T: Entity>() -> Self {
        Self::table(T::TABLE)
    }

    /// Set a column to a value.
    pub fn set(&mut self, column: &str, value: impl Into<BoundValue>) -> &mut Self {
        let taken: BTreeSet<String> = self.filter.named().keys().cloned().collect();
        let (placeholder, values) =
            mode::column_param::<M>(column, value.into(), &mut self.named, &taken);
        if let Some(name) = placeholder.strip_prefix(':') {
            self.filter.reserve(name);
        }
        self.sets
            .push(Fragment::new(format!("{} = {}", column, placeholder), values));
        self
    }

    /// Set a column only when the value is present.
    pub fn set_opt<T: Into<BoundValue>>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.set(column, v);
        }
        self
    }

    /// Set a column to a raw SQL expression such as `version + 1`.
    pub fn set_raw(&mut self, column: &str, expr: &str) -> &mut Self {
        self.sets.push(Fragment::raw(format!("{} = {}", column, expr)));
        self
    }

    pub fn and_where(&mut self, condition: &str) -> &mut Self {
        self.filter.and_where(condition);
        self
    }

    pub fn and_eq(&mut self, column: &str, value: impl Into<BoundValue>) -> &mut Self {
        self.filter.and_eq(column, value.into());
        self
    }

    pub fn and_where_with<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Predicate<M>),
    {
        self.filter.and_where_with(f);
        self
    }

    /// Permit an UPDATE without WHERE.
    pub fn allow_all(&mut self) -> &mut Self {
        self.allow_all = true;
        self
    }

    fn render_parts(&self) -> (String, Vec<BoundValue>) {
        let mut sql = format!("UPDATE {} SET ", self.table);
        let mut values = Vec::new();
        push_list(&mut sql, &self.sets, ", ", &mut values);
        self.filter.render_into(&mut sql, &mut values);
        (sql, values)
    }

    pub fn to_sql(&self) -> String {
        self.render_parts().0
    }
}

impl UpdateSql<Indexed> {
    /// AND a WHERE condition together with the values for its `?`s.
    pub fn and_where_bind<I>(&mut self, condition: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        self.filter.and_where_bind(condition, values);
        self
    }
}

impl UpdateSql<Named> {
    /// Bind a `:name` used in a raw condition.
    pub fn bind(&mut self, name: &str, value: impl Into<BoundValue>) -> &mut Self {
        self.filter.bind(name, value.into());
        self
    }
}

impl<M: BindMode> Statement for UpdateSql<M> {
    fn render(&self) -> SqlResult<Rendered> {
        if let Some(err) = self.filter.build_error() {
            return Err(SqlError::build(err));
        }
        if self.sets.is_empty() {
            return Err(SqlError::build(format!("UPDATE {} has no SET columns", self.table)));
        }
        if self.filter.is_empty() && !self.allow_all {
            return Err(SqlError::build(format!(
                "UPDATE {} without WHERE; call allow_all() to update every row",
                self.table
            )));
        }
        let (sql, values) = self.render_parts();
        let mut named = self.named.clone();
        for (name, value) in self.filter.named() {
            if named.get(name).is_some_and(|set| set != value) {
                return Err(SqlError::build(format!(
                    "UPDATE {}: ':{}' is bound both by SET and WHERE with different values",
                    self.table, name
                )));
            }
            named.insert(name.clone(), value.clone());
        }
        Ok(Rendered::new(sql, M::collect(&named, values)))
    }
}
