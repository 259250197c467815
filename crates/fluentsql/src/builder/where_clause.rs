//! Shared WHERE clause state for UPDATE and DELETE.

use super::clause::{Conjunction, Fragment};
use super::mode::{self, BindMode, Indexed, Named};
use super::predicate::Predicate;
use crate::params::BoundValue;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

/// Reusable WHERE clause with its named binds and first build error.
#[derive(Debug, Clone)]
pub struct WhereClause<M: BindMode> {
    conditions: Conjunction,
    named: BTreeMap<String, BoundValue>,
    reserved: BTreeSet<String>,
    build_error: Option<String>,
    _mode: PhantomData<M>,
}

impl<M: BindMode> Default for WhereClause<M> {
    fn default() -> Self {
        Self {
            conditions: Conjunction::default(),
            named: BTreeMap::new(),
            reserved: BTreeSet::new(),
            build_error: None,
            _mode: PhantomData,
        }
    }
}

impl<M: BindMode> WhereClause<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    pub fn named(&self) -> &BTreeMap<String, BoundValue> {
        &self.named
    }

    /// Keep generated names clear of a name bound elsewhere in the statement.
    pub(crate) fn reserve(&mut self, name: &str) {
        self.reserved.insert(name.to_string());
    }

    fn record_error(&mut self, message: String) {
        if self.build_error.is_none() {
            self.build_error = Some(message);
        }
    }

    pub(crate) fn push(&mut self, fragment: Fragment) {
        if fragment.is_empty() {
            return;
        }
        match M::check_fragment(&fragment) {
            Ok(()) => self.conditions.push(fragment),
            Err(err) => self.record_error(err),
        }
    }

    /// AND a raw condition.
    pub fn and_where(&mut self, condition: &str) {
        self.push(Fragment::raw(condition));
    }

    /// AND `column = <param>`.
    pub fn and_eq(&mut self, column: &str, value: BoundValue) {
        let (placeholder, values) = mode::column_param::<M>(column, value, &mut self.named, &self.reserved);
        self.push(Fragment::new(format!("{} = {}", column, placeholder), values));
    }

    /// AND a condition composed in a callback.
    pub fn and_where_with<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Predicate<M>),
    {
        let mut predicate = Predicate::reserving(self.reserved.iter().chain(self.named.keys()));
        f(&mut predicate);
        let (fragment, mut named, error) = predicate.into_parts();
        if let Some(err) = error {
            self.record_error(err);
            return;
        }
        self.named.append(&mut named);
        self.push(fragment);
    }

    /// Append ` WHERE ...` to `out`, collecting positional values.
    pub fn render_into(&self, out: &mut String, values: &mut Vec<BoundValue>) {
        self.conditions.render_into(out, "WHERE", values);
    }
}

impl WhereClause<Indexed> {
    /// AND a condition together with the values for its `?`s.
    pub fn and_where_bind<I>(&mut self, condition: &str, values: I)
    where
        I: IntoIterator,
        I::Item: Into<BoundValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(Fragment::new(condition, values));
    }
}

impl WhereClause<Named> {
    /// Bind a value to `:name`.
    pub fn bind(&mut self, name: &str, value: BoundValue) {
        self.named.insert(name.to_string(), value);
    }
}
