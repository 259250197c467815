use super::mode::{BindMode, Indexed, Named};
use super::predicate::Predicate;
use super::where_clause::WhereClause;
use crate::entity::Entity;
use crate::error::{SqlError, SqlResult};
use crate::params::BoundValue;
use crate::statement::{Rendered, Statement};

/// DELETE builder. Refuses to render without WHERE unless
/// [`allow_all`](Self::allow_all) was called.
#[derive(Debug, Clone)]
pub struct DeleteSql<M: BindMode> {
    table: String,
    filter: WhereClause<M>,
    allow_all: bool,
}

impl<M: BindMode> DeleteSql<M> {
    pub fn from_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: WhereClause::new(),
            allow_all: false,
        }
    }

    pub fn from_entity<T: Entity>() -> Self {
        Self::from_table(T::TABLE)
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

    pub fn allow_all(&mut self) -> &mut Self {
        self.allow_all = true;
        self
    }

    fn render_parts(&self) -> (String, Vec<BoundValue>) {
        let mut sql = format!("DELETE FROM {}", self.table);
        let mut values = Vec::new();
        self.filter.render_into(&mut sql, &mut values);
        (sql, values)
    }

    pub fn to_sql(&self) -> String {
        self.render_parts().0
    }
}

impl DeleteSql<Indexed> {
    pub fn and_where_bind<I>(&mut self, condition: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        self.filter.and_where_bind(condition, values);
        self
    }
}

impl DeleteSql<Named> {
    pub fn bind(&mut self, name: &str, value: impl Into<BoundValue>) -> &mut Self {
        self.filter.bind(name, value.into());
        self
    }
}

impl<M: BindMode> Statement for DeleteSql<M> {
    fn render(&self) -> SqlResult<Rendered> {
        if let Some(err) = self.filter.build_error() {
            return Err(SqlError::build(err));
        }
        if self.filter.is_empty() && !self.allow_all {
            return Err(SqlError::build(format!(
                "DELETE FROM {} without WHERE; call allow_all() to delete every row",
                self.table
            )));
        }
        let (sql, values) = self.render_parts();
        Ok(Rendered::new(sql, M::collect(self.filter.named(), values)))
    }
}
