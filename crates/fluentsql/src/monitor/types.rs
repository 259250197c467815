use std::fmt;
use std::time::Duration;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    /// DDL, CTEs and anything else
    Other,
}

const KEYWORDS: [(&str, QueryType); 4] = [
    ("SELECT", QueryType::Select),
    ("INSERT", QueryType::Insert),
    ("UPDATE", QueryType::Update),
    ("DELETE", QueryType::Delete),
];

impl QueryType {
    /// Classify by the first keyword, ignoring leading whitespace, comments
    /// and opening parentheses.
    pub fn from_sql(sql: &str) -> Self {
        let head = leading_statement(sql);
        KEYWORDS
            .iter()
            .find(|(kw, _)| head.get(..kw.len()).is_some_and(|p| p.eq_ignore_ascii_case(kw)))
            .map_or(QueryType::Other, |(_, kind)| *kind)
    }
}

/// `sql` with leading whitespace, comments and `(` removed; empty if a
/// comment never closes.
fn leading_statement(sql: &str) -> &str {
    let mut rest = sql.trim_start();
    loop {
        let skipped = if rest.starts_with("--") {
            rest.find('\n').map(|pos| pos + 1)
        } else if rest.starts_with("/*") {
            rest.find("*/").map(|pos| pos + 2)
        } else if rest.starts_with('(') {
            Some(1)
        } else {
            return rest;
        };
        match skipped {
            Some(n) => rest = rest[n..].trim_start(),
            None => return "",
        }
    }
}

/// What the repository is about to run.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// SQL as rendered by the builder.
    pub sql: String,
    pub param_count: usize,
    pub query_type: QueryType,
    /// Repository tag, if configured.
    pub tag: Option<String>,
}

impl QueryContext {
    pub fn new(sql: &str, param_count: usize) -> Self {
        Self {
            sql: sql.to_string(),
            param_count,
            query_type: QueryType::from_sql(sql),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

const MAX_ERROR_LEN: usize = 512;

/// Outcome of one execution, for hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Query returned rows.
    Rows(usize),
    /// Write affected rows (summed over a batch).
    Affected(u64),
    /// Failed; message truncated to 512 bytes.
    Error(String),
}

impl QueryResult {
    pub fn error(msg: String) -> Self {
        if msg.len() <= MAX_ERROR_LEN {
            return Self::Error(msg);
        }
        Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Affected(n) => write!(f, "{n} affected"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Action to take after a hook inspected a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    /// Refuse the query; the repository returns [`SqlError::Aborted`](crate::SqlError::Aborted).
    Abort(String),
}

/// Lifecycle callbacks around every statement the repository sends.
pub trait QueryHook: Send + Sync {
    /// Called after validation, right before the collaborator runs the query.
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    /// Called once the collaborator returned, successfully or not.
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}
