use super::clause::{Conjunction, Direction, Fragment, Join, JoinKind, OrderBy, push_list, render_order_by};
use super::mode::BindMode;
use super::predicate::Predicate;
use crate::entity::Entity;
use crate::error::{SqlError, SqlResult};
use crate::params::BoundValue;
use crate::statement::Rendered;
use std::collections::BTreeMap;

const AGGREGATES: &[&str] = &[
    "count", "sum", "avg", "min", "max", "array_agg", "string_agg", "json_agg", "jsonb_agg",
    "json_object_agg", "jsonb_object_agg", "bool_and", "bool_or", "every", "bit_and", "bit_or",
    "stddev", "stddev_pop", "stddev_samp", "variance", "var_pop", "var_samp",
];

/// Finds `name(` calls to an aggregate function, skipping window calls
/// (`... ) OVER`) and text inside quotes.
fn contains_aggregate(sql: &str) -> bool {
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\'' || b == b'"' {
            i = skip_quoted(bytes, i);
            continue;
        }
        if !(b.is_ascii_alphabetic() || b == b'_') {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
            i += 1;
        }
        if start > 0 && bytes[start - 1] == b'.' {
            continue;
        }
        let word = &sql[start..i];
        if !AGGREGATES.iter().any(|a| a.eq_ignore_ascii_case(word)) {
            continue;
        }
        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'(') {
            continue;
        }
        let Some(close) = matching_paren(bytes, j) else {
            return true;
        };
        let rest = sql[close + 1..].trim_start();
        let windowed = rest
            .get(..4)
            .is_some_and(|w| w.eq_ignore_ascii_case("over"))
            && !rest[4..].starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_');
        if !windowed {
            return true;
        }
    }
    false
}

fn skip_quoted(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    i
}

fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                i = skip_quoted(bytes, i);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Select,
    From,
    Where,
    Having,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// Everything, including LIMIT/OFFSET.
    Full,
    /// Everything except LIMIT/OFFSET (the base of a bounded query).
    Unbounded,
    /// Row count of the unbounded query.
    Count,
}

/// Clause state shared by [`NamedSelect`](super::NamedSelect) and
/// [`IndexedSelect`](super::IndexedSelect).
///
/// Sections always render as SELECT, FROM, JOIN, WHERE, GROUP BY, HAVING,
/// ORDER BY, LIMIT/OFFSET no matter in which order they were filled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectStatement {
    /// SELECT expressions (empty renders `*`)
    select: Vec<Fragment>,
    /// FROM sources, comma-joined
    from: Vec<Fragment>,
    /// JOIN clauses
    joins: Vec<Join>,
    /// WHERE conditions (AND)
    wheres: Conjunction,
    /// GROUP BY columns
    group_by: Vec<String>,
    /// HAVING conditions (AND)
    having: Conjunction,
    /// ORDER BY entries
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// Named binds (named mode only)
    named: BTreeMap<String, BoundValue>,
    /// First build error, reported at render time
    build_error: Option<String>,
}

impl SelectStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    pub fn named_params(&self) -> &BTreeMap<String, BoundValue> {
        &self.named
    }

    pub fn has_group_by(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    pub(crate) fn record_error(&mut self, message: String) {
        if self.build_error.is_none() {
            self.build_error = Some(message);
        }
    }

    pub(crate) fn push<M: BindMode>(&mut self, section: Section, fragment: Fragment) {
        if fragment.is_empty() {
            return;
        }
        if let Err(err) = M::check_fragment(&fragment) {
            self.record_error(err);
            return;
        }
        match section {
            Section::Select => self.select.push(fragment),
            Section::From => self.from.push(fragment),
            Section::Where => self.wheres.push(fragment),
            Section::Having => self.having.push(fragment),
        }
    }

    pub(crate) fn push_join<M: BindMode>(&mut self, kind: JoinKind, target: Fragment) {
        if target.is_empty() {
            return;
        }
        if let Err(err) = M::check_fragment(&target) {
            self.record_error(err);
            return;
        }
        self.joins.push(Join { kind, target });
    }

    pub(crate) fn accept_predicate<M: BindMode>(&mut self, section: Section, predicate: Predicate<M>) {
        let (fragment, mut named, error) = predicate.into_parts();
        if let Some(err) = error {
            self.record_error(err);
            return;
        }
        self.named.append(&mut named);
        self.push::<M>(section, fragment);
    }

    pub(crate) fn bind(&mut self, name: &str, value: BoundValue) {
        self.named.insert(name.to_string(), value);
    }

    pub(crate) fn add_group_by(&mut self, columns: &[&str]) {
        self.group_by.extend(columns.iter().map(|c| c.to_string()));
    }

    pub(crate) fn add_order_by(&mut self, columns: &[&str], direction: Option<Direction>) {
        self.order_by.extend(columns.iter().map(|c| OrderBy {
            expr: c.to_string(),
            direction,
        }));
    }

    pub(crate) fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    pub(crate) fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    fn render_select_list(&self, out: &mut String, values: &mut Vec<BoundValue>) {
        out.push_str("SELECT ");
        if self.select.is_empty() {
            out.push('*');
        } else {
            push_list(out, &self.select, ", ", values);
        }
    }

    /// FROM through HAVING.
    fn render_body(&self, out: &mut String, values: &mut Vec<BoundValue>) {
        if !self.from.is_empty() {
            out.push_str(" FROM ");
            push_list(out, &self.from, ", ", values);
        }

        for join in &self.joins {
            out.push(' ');
            out.push_str(join.kind.keyword());
            out.push(' ');
            out.push_str(&join.target.sql);
            values.extend(join.target.values.iter().cloned());
        }

        self.wheres.render_into(out, "WHERE", values);

        if !self.group_by.is_empty() {
            out.push_str(" GROUP BY ");
            out.push_str(&self.group_by.join(", "));
        }

        self.having.render_into(out, "HAVING", values);
    }

    fn is_distinct(&self) -> bool {
        self.select.first().is_some_and(|f| {
            f.sql
                .trim_start()
                .get(..9)
                .is_some_and(|s| s.eq_ignore_ascii_case("DISTINCT "))
        })
    }

    /// Whether the select list collapses rows through an aggregate call.
    fn has_aggregate(&self) -> bool {
        self.select.iter().any(|f| contains_aggregate(&f.sql))
    }

    /// Selects whose row count differs from the FROM/WHERE row count (grouped,
    /// HAVING, DISTINCT or aggregate lists) are counted as a subquery.
    fn count_needs_subquery(&self) -> bool {
        !self.group_by.is_empty()
            || !self.having.is_empty()
            || self.is_distinct()
            || self.has_aggregate()
    }

    pub(crate) fn render_shape(&self, shape: Shape) -> (String, Vec<BoundValue>) {
        let mut sql = String::new();
        let mut values = Vec::new();

        if shape == Shape::Count {
            if self.count_needs_subquery() {
                let mut inner = String::new();
                self.render_select_list(&mut inner, &mut values);
                self.render_body(&mut inner, &mut values);
                sql = format!("SELECT COUNT(*) FROM ({}) AS t", inner);
            } else {
                sql.push_str("SELECT COUNT(*)");
                self.render_body(&mut sql, &mut values);
            }
            return (sql, values);
        }

        self.render_select_list(&mut sql, &mut values);
        self.render_body(&mut sql, &mut values);
        render_order_by(&mut sql, &self.order_by);

        if shape == Shape::Full {
            if let Some(limit) = self.limit {
                sql.push_str(&format!(" LIMIT {}", limit));
            }
            if let Some(offset) = self.offset {
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }
        (sql, values)
    }

    /// Render the full SQL text. Pure function of the current state.
    pub fn to_sql(&self) -> String {
        self.render_shape(Shape::Full).0
    }

    pub(crate) fn render<M: BindMode>(&self, shape: Shape) -> SqlResult<Rendered> {
        if let Some(err) = &self.build_error {
            return Err(SqlError::Build(err.clone()));
        }
        if self.select.is_empty() && self.from.is_empty() {
            return Err(SqlError::build("SELECT statement has neither columns nor FROM"));
        }
        let (sql, values) = self.render_shape(shape);
        Ok(Rendered::new(sql, M::collect(&self.named, values)))
    }
}

/// Clause vocabulary shared by the SELECT builders.
///
/// Implementors only expose their [`SelectStatement`]; every method here returns
/// `&mut Self`, so chains keep the concrete builder type and its binding methods.
pub trait SelectClauses: Sized {
    /// Placeholder discipline of this builder.
    type Mode: BindMode;

    fn statement(&self) -> &SelectStatement;

    fn statement_mut(&mut self) -> &mut SelectStatement;

    /// Append SELECT columns/expressions.
    fn select(&mut self, columns: &[&str]) -> &mut Self {
        for col in columns {
            self.statement_mut()
                .push::<Self::Mode>(Section::Select, Fragment::raw(*col));
        }
        self
    }

    /// Append the mapped columns of `T`.
    fn select_entity<T: Entity>(&mut self) -> &mut Self {
        for field in T::FIELDS {
            self.statement_mut()
                .push::<Self::Mode>(Section::Select, Fragment::raw(field.column));
        }
        self
    }

    /// Columns and table of `T`.
    fn select_from<T: Entity>(&mut self) -> &mut Self {
        self.select_entity::<T>().from_entity::<T>()
    }

    /// Append FROM sources (comma-joined).
    fn from(&mut self, tables: &[&str]) -> &mut Self {
        for table in tables {
            self.statement_mut()
                .push::<Self::Mode>(Section::From, Fragment::raw(*table));
        }
        self
    }

    /// Append the table of `T`.
    fn from_entity<T: Entity>(&mut self) -> &mut Self {
        self.statement_mut()
            .push::<Self::Mode>(Section::From, Fragment::raw(T::TABLE));
        self
    }

    /// Append a join clause of the given kind.
    fn join_kind(&mut self, kind: JoinKind, target: &str) -> &mut Self {
        self.statement_mut()
            .push_join::<Self::Mode>(kind, Fragment::raw(target));
        self
    }

    fn join(&mut self, target: &str) -> &mut Self {
        self.join_kind(JoinKind::Join, target)
    }

    fn inner_join(&mut self, target: &str) -> &mut Self {
        self.join_kind(JoinKind::Inner, target)
    }

    fn left_join(&mut self, target: &str) -> &mut Self {
        self.join_kind(JoinKind::Left, target)
    }

    fn right_join(&mut self, target: &str) -> &mut Self {
        self.join_kind(JoinKind::Right, target)
    }

    fn left_outer_join(&mut self, target: &str) -> &mut Self {
        self.join_kind(JoinKind::LeftOuter, target)
    }

    fn right_outer_join(&mut self, target: &str) -> &mut Self {
        self.join_kind(JoinKind::RightOuter, target)
    }

    fn cross_join(&mut self, target: &str) -> &mut Self {
        self.join_kind(JoinKind::Cross, target)
    }

    /// AND a raw WHERE condition.
    ///
    /// The text is not parenthesised; OR grouping is the caller's job here.
    fn and_where(&mut self, condition: &str) -> &mut Self {
        self.statement_mut()
            .push::<Self::Mode>(Section::Where, Fragment::raw(condition));
        self
    }

    /// AND a WHERE condition composed in a callback.
    fn and_where_with<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Predicate<Self::Mode>),
    {
        let mut predicate = Predicate::reserving(self.statement().named_params().keys());
        f(&mut predicate);
        self.statement_mut()
            .accept_predicate(Section::Where, predicate);
        self
    }

    fn group_by(&mut self, columns: &[&str]) -> &mut Self {
        self.statement_mut().add_group_by(columns);
        self
    }

    /// AND a raw HAVING condition.
    fn having(&mut self, condition: &str) -> &mut Self {
        self.statement_mut()
            .push::<Self::Mode>(Section::Having, Fragment::raw(condition));
        self
    }

    /// AND a HAVING condition composed in a callback.
    fn having_with<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Predicate<Self::Mode>),
    {
        let mut predicate = Predicate::reserving(self.statement().named_params().keys());
        f(&mut predicate);
        self.statement_mut()
            .accept_predicate(Section::Having, predicate);
        self
    }

    /// Append ORDER BY entries as written (direction may be part of the text).
    fn order_by(&mut self, columns: &[&str]) -> &mut Self {
        self.statement_mut().add_order_by(columns, None);
        self
    }

    fn order_by_asc(&mut self, columns: &[&str]) -> &mut Self {
        self.statement_mut()
            .add_order_by(columns, Some(Direction::Asc));
        self
    }

    fn order_by_desc(&mut self, columns: &[&str]) -> &mut Self {
        self.statement_mut()
            .add_order_by(columns, Some(Direction::Desc));
        self
    }

    fn limit(&mut self, limit: u64) -> &mut Self {
        self.statement_mut().set_limit(limit);
        self
    }

    fn offset(&mut self, offset: u64) -> &mut Self {
        self.statement_mut().set_offset(offset);
        self
    }

    /// Render the SQL text; idempotent.
    fn to_sql(&self) -> String {
        self.statement().to_sql()
    }

    /// Render the COUNT(*) statement used for paging.
    fn to_count_sql(&self) -> String {
        self.statement().render_shape(Shape::Count).0
    }
}
