use super::*;

#[test]
fn test_query_type_detection() {
    assert_eq!(QueryType::from_sql("SELECT 1"), QueryType::Select);
    assert_eq!(QueryType::from_sql("  select * from t"), QueryType::Select);
    assert_eq!(QueryType::from_sql("(SELECT 1)"), QueryType::Select);
    assert_eq!(
        QueryType::from_sql("-- fetch\nINSERT INTO t VALUES (1)"),
        QueryType::Insert
    );
    assert_eq!(
        QueryType::from_sql("/* bump */ UPDATE t SET a = 1"),
        QueryType::Update
    );
    assert_eq!(QueryType::from_sql("DELETE FROM t"), QueryType::Delete);
    assert_eq!(QueryType::from_sql("CREATE TABLE t (a int)"), QueryType::Other);
    assert_eq!(QueryType::from_sql("-- only a comment"), QueryType::Other);
}

#[test]
fn test_truncate_respects_char_boundary() {
    assert_eq!(truncate_sql_bytes("héllo", 2), "h");
    assert_eq!(truncate_sql_bytes("abc", 10), "abc");
}

#[test]
fn test_error_result_is_truncated() {
    let long = "x".repeat(600);
    let QueryResult::Error(msg) = QueryResult::error(long) else {
        panic!("expected error");
    };
    assert_eq!(msg.len(), 515);
    assert!(msg.ends_with("..."));
}

#[test]
fn test_context_carries_tag() {
    let ctx = QueryContext::new("UPDATE t SET a = ?", 1).with_tag("billing");
    assert_eq!(ctx.query_type, QueryType::Update);
    assert_eq!(ctx.tag.as_deref(), Some("billing"));
}

#[test]
fn test_tracing_hook_continues() {
    let hook = TracingSqlHook::new().max_sql_length(5);
    let ctx = QueryContext::new("SELECT * FROM very_long_table", 0);
    assert_eq!(hook.before_query(&ctx), HookAction::Continue);
}
