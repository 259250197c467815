//! Clause containers: the structured pieces a statement is rendered from.
//!
//! Every entry that may contain `?` placeholders is a [`Fragment`] carrying its
//! own positional values, so values are always collected in rendered order.

use crate::params::BoundValue;

/// SQL text plus the positional values for the `?` placeholders inside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub values: Vec<BoundValue>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, values: Vec<BoundValue>) -> Self {
        Self {
            sql: sql.into(),
            values,
        }
    }

    /// Fragment without positional values.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

/// Join flavour of one join clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Join,
    Inner,
    Left,
    Right,
    LeftOuter,
    RightOuter,
    Cross,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Join => "JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::RightOuter => "RIGHT OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// One join clause; `target` is caller text such as `"t2 ON t1.id = t2.fk"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub target: Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: String,
    pub direction: Option<Direction>,
}

impl OrderBy {
    fn render(&self) -> String {
        match self.direction {
            Some(dir) => format!("{} {}", self.expr, dir.keyword()),
            None => self.expr.clone(),
        }
    }
}

/// Predicates joined with AND (WHERE, HAVING).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conjunction {
    items: Vec<Fragment>,
}

impl Conjunction {
    pub fn push(&mut self, fragment: Fragment) {
        self.items.push(fragment);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Append ` KEYWORD a AND b ...` to `out`, collecting values in order.
    pub fn render_into(&self, out: &mut String, keyword: &str, values: &mut Vec<BoundValue>) {
        if self.items.is_empty() {
            return;
        }
        out.push(' ');
        out.push_str(keyword);
        out.push(' ');
        push_list(out, &self.items, " AND ", values);
    }
}

/// Append fragments joined by `sep`, collecting their values in order.
pub(crate) fn push_list(
    out: &mut String,
    fragments: &[Fragment],
    sep: &str,
    values: &mut Vec<BoundValue>,
) {
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(&fragment.sql);
        values.extend(fragment.values.iter().cloned());
    }
}

pub(crate) fn render_order_by(out: &mut String, entries: &[OrderBy]) {
    if entries.is_empty() {
        return;
    }
    out.push_str(" ORDER BY ");
    let rendered: Vec<String> = entries.iter().map(OrderBy::render).collect();
    out.push_str(&rendered.join(", "));
}
