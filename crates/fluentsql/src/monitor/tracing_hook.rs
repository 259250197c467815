use super::truncate_sql_bytes;
use super::types::{HookAction, QueryContext, QueryHook, QueryResult};
use std::time::Duration;
use tracing::Level;

/// Logs statements through `tracing` on target `fluentsql.sql`.
///
/// Each statement is logged at [`level`](Self::level) before it runs. Failed
/// statements are always reported at WARN; successful completions only when
/// [`log_completion`](Self::log_completion) is set.
#[derive(Debug, Clone)]
pub struct TracingSqlHook {
    pub level: Level,
    /// SQL longer than this many bytes is cut and suffixed with `...`.
    pub max_sql_length: Option<usize>,
    pub log_completion: bool,
}

impl Default for TracingSqlHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            log_completion: false,
        }
    }
}

macro_rules! event_at {
    ($level:expr, $($arg:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)*),
            Level::WARN => tracing::warn!($($arg)*),
            Level::INFO => tracing::info!($($arg)*),
            Level::DEBUG => tracing::debug!($($arg)*),
            Level::TRACE => tracing::trace!($($arg)*),
        }
    };
}

impl TracingSqlHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn log_completion(mut self) -> Self {
        self.log_completion = true;
        self
    }

    fn shown_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }
}

impl QueryHook for TracingSqlHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        event_at!(
            self.level,
            target: "fluentsql.sql",
            kind = ?ctx.query_type,
            tag = ctx.tag.as_deref().unwrap_or("-"),
            params = ctx.param_count,
            sql = %self.shown_sql(&ctx.sql),
            "executing"
        );
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let elapsed_ms = duration.as_millis() as u64;
        if let QueryResult::Error(message) = result {
            tracing::warn!(
                target: "fluentsql.sql",
                kind = ?ctx.query_type,
                tag = ctx.tag.as_deref().unwrap_or("-"),
                elapsed_ms,
                error = %message,
                sql = %self.shown_sql(&ctx.sql),
                "statement failed"
            );
            return;
        }
        if self.log_completion {
            event_at!(
                self.level,
                target: "fluentsql.sql",
                kind = ?ctx.query_type,
                tag = ctx.tag.as_deref().unwrap_or("-"),
                elapsed_ms,
                outcome = %result,
                "finished"
            );
        }
    }
}
