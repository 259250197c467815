use super::clause::{Fragment, push_list};
use super::mode::{self, BindMode};
use crate::entity::Entity;
use crate::error::{SqlError, SqlResult};
use crate::params::BoundValue;
use crate::statement::{Rendered, Statement};
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

/// INSERT builder for a single row.
///
/// In named mode each value is written as `:column`; in indexed mode as `?`.
///
/// ```ignore
/// use fluentsql::{Indexed, InsertSql};
///
/// let mut insert = InsertSql::<Indexed>::into_table("users");
/// insert.value("name", "alice").value("age", 30);
/// assert_eq!(insert.to_sql(), "INSERT INTO users (name, age) VALUES (?, ?)");
/// ```
#[derive(Debug, Clone)]
pub struct InsertSql<M: BindMode> {
    table: String,
    columns: Vec<String>,
    values: Vec<Fragment>,
    returning: Vec<String>,
    named: BTreeMap<String, BoundValue>,
    _mode: PhantomData<M>,
}

impl<M: BindMode> InsertSql<M> {
    pub fn into_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            values: Vec::new(),
            returning: Vec::new(),
            named: BTreeMap::new(),
            _mode: PhantomData,
        }
    }

    /// Insert into the table of `T`.
    pub fn into_entity<T: Entity>() -> Self {
        Self::into_table(T::TABLE)
    }

    /// Add a column and its value.
    pub fn value(&mut self, column: &str, value: impl Into<BoundValue>) -> &mut Self {
        let (placeholder, values) =
            mode::column_param::<M>(column, value.into(), &mut self.named, &BTreeSet::new());
        self.columns.push(column.to_string());
        self.values.push(Fragment::new(placeholder, values));
        self
    }

    /// Add a column only when the value is present.
    pub fn value_opt<T: Into<BoundValue>>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.value(column, v);
        }
        self
    }

    /// Add a column set to a raw SQL expression such as `now()`.
    pub fn value_raw(&mut self, column: &str, expr: &str) -> &mut Self {
        self.columns.push(column.to_string());
        self.values.push(Fragment::raw(expr));
        self
    }

    /// Set the RETURNING columns.
    pub fn returning(&mut self, columns: &[&str]) -> &mut Self {
        self.returning = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn render_parts(&self) -> (String, Vec<BoundValue>) {
        let mut sql = format!("INSERT INTO {} ({}) VALUES (", self.table, self.columns.join(", "));
        let mut values = Vec::new();
        push_list(&mut sql, &self.values, ", ", &mut values);
        sql.push(')');
        if !self.returning.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning.join(", "));
        }
        (sql, values)
    }

    pub fn to_sql(&self) -> String {
        self.render_parts().0
    }
}

impl<M: BindMode> Statement for InsertSql<M> {
    fn render(&self) -> SqlResult<Rendered> {
        if self.columns.is_empty() {
            return Err(SqlError::build(format!(
                "INSERT INTO {} has no columns",
                self.table
            )));
        }
        let (sql, values) = self.render_parts();
        Ok(Rendered::new(sql, M::collect(&self.named, values)))
    }
}
