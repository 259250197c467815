//! Query hooks around repository execution.
//!
//! ```rust,ignore
//! use fluentsql::monitor::TracingSqlHook;
//! use fluentsql::Repository;
//!
//! let repo = Repository::new(access).with_hook(TracingSqlHook::new().log_completion());
//! ```

mod tracing_hook;
mod types;

#[cfg(test)]
mod tests;

pub use tracing_hook::TracingSqlHook;
pub use types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
