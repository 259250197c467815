//! Repository configuration.

use std::time::Duration;

/// What `query_object*` does when the statement returns more than one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SingleRowPolicy {
    /// Return the first row and ignore the rest.
    #[default]
    First,
    /// Fail with [`SqlError::TooManyRows`](crate::SqlError::TooManyRows).
    Strict,
}

/// Settings for a [`Repository`](crate::Repository).
///
/// ```ignore
/// let config = RepositoryConfig::new()
///     .single_row(SingleRowPolicy::Strict)
///     .slow_query_threshold(Duration::from_millis(250))
///     .tag("billing");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryConfig {
    pub single_row: SingleRowPolicy,
    /// Queries slower than this are reported on target `fluentsql.slow`.
    pub slow_query_threshold: Option<Duration>,
    /// Attached to every [`QueryContext`](crate::monitor::QueryContext).
    pub tag: Option<String>,
}

impl RepositoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single_row(mut self, policy: SingleRowPolicy) -> Self {
        self.single_row = policy;
        self
    }

    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}
