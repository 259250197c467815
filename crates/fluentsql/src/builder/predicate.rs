//! Predicate builder used by `and_where_with` / `having_with` callbacks.

use super::clause::Fragment;
use super::mode::{self, BindMode, Indexed, Named};
use crate::params::{self, BoundValue};
use crate::value::ValueKind;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

/// Composes one predicate from AND/OR parts and parenthesised groups.
///
/// The result is conjoined with the statement's other predicates; a predicate
/// containing a top-level OR is wrapped in parentheses first.
#[derive(Debug, Clone)]
pub struct Predicate<M: BindMode> {
    sql: String,
    values: Vec<BoundValue>,
    named: BTreeMap<String, BoundValue>,
    /// Names bound outside this predicate; generated names avoid them.
    reserved: BTreeSet<String>,
    has_or: bool,
    error: Option<String>,
    _mode: PhantomData<M>,
}

impl<M: BindMode> Default for Predicate<M> {
    fn default() -> Self {
        Self {
            sql: String::new(),
            values: Vec::new(),
            named: BTreeMap::new(),
            reserved: BTreeSet::new(),
            has_or: false,
            error: None,
            _mode: PhantomData,
        }
    }
}

impl<M: BindMode> Predicate<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A predicate whose generated names stay clear of `names`.
    pub(crate) fn reserving<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            reserved: names.into_iter().cloned().collect(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    fn push(&mut self, connective: &str, sql: &str, values: Vec<BoundValue>) {
        if sql.trim().is_empty() {
            return;
        }
        if !self.sql.is_empty() {
            self.sql.push(' ');
            self.sql.push_str(connective);
            self.sql.push(' ');
            if connective == "OR" {
                self.has_or = true;
            }
        }
        self.sql.push_str(sql);
        self.values.extend(values);
    }

    fn record_error(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    /// AND a raw condition.
    pub fn and(&mut self, sql: &str) -> &mut Self {
        self.push("AND", sql, Vec::new());
        self
    }

    /// OR a raw condition.
    pub fn or(&mut self, sql: &str) -> &mut Self {
        self.push("OR", sql, Vec::new());
        self
    }

    fn eq(&mut self, connective: &str, column: &str, value: BoundValue) {
        let (placeholder, values) = mode::column_param::<M>(column, value, &mut self.named, &self.reserved);
        self.push(connective, &format!("{} = {}", column, placeholder), values);
    }

    /// AND `column = <param>`.
    pub fn and_eq(&mut self, column: &str, value: impl Into<BoundValue>) -> &mut Self {
        self.eq("AND", column, value.into());
        self
    }

    /// OR `column = <param>`.
    pub fn or_eq(&mut self, column: &str, value: impl Into<BoundValue>) -> &mut Self {
        self.eq("OR", column, value.into());
        self
    }

    fn group<F>(&mut self, connective: &str, f: F)
    where
        F: FnOnce(&mut Predicate<M>),
    {
        let mut inner = Predicate::<M>::reserving(self.reserved.iter().chain(self.named.keys()));
        f(&mut inner);
        if let Some(err) = inner.error.take() {
            self.record_error(err);
        }
        self.named.append(&mut inner.named);
        if inner.is_empty() {
            return;
        }
        let text = format!("({})", inner.sql);
        self.push(connective, &text, inner.values);
    }

    /// AND a parenthesised group.
    pub fn and_group<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Predicate<M>),
    {
        self.group("AND", f);
        self
    }

    /// OR a parenthesised group.
    pub fn or_group<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Predicate<M>),
    {
        self.group("OR", f);
        self
    }

    /// Split into the clause fragment, named binds and the first recorded error.
    pub(crate) fn into_parts(self) -> (Fragment, BTreeMap<String, BoundValue>, Option<String>) {
        let sql = if self.has_or {
            format!("({})", self.sql)
        } else {
            self.sql
        };
        (Fragment::new(sql, self.values), self.named, self.error)
    }
}

impl Predicate<Indexed> {
    fn push_bind<I>(&mut self, connective: &str, sql: &str, values: I)
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        let values: Vec<BoundValue> = values.into_iter().map(Into::into).collect();
        let expected = params::count_positional(sql);
        if expected != values.len() {
            self.record_error(format!(
                "'{}' has {} '?', but {} values provided",
                sql,
                expected,
                values.len()
            ));
            return;
        }
        self.push(connective, sql, values);
    }

    /// AND a condition with `?` placeholders and their values.
    pub fn and_bind<I>(&mut self, sql: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        self.push_bind("AND", sql, values);
        self
    }

    /// OR a condition with `?` placeholders and their values.
    pub fn or_bind<I>(&mut self, sql: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        self.push_bind("OR", sql, values);
        self
    }
}

impl Predicate<Named> {
    /// Bind a `:name` used in this predicate.
    pub fn bind(&mut self, name: &str, value: impl Into<BoundValue>) -> &mut Self {
        self.named.insert(name.to_string(), value.into());
        self
    }

    /// Bind a typed NULL.
    pub fn bind_null(&mut self, name: &str, kind: ValueKind) -> &mut Self {
        self.bind(name, BoundValue::null(kind))
    }
}
