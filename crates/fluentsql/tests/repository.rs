mod common;

use common::{MockAccess, user_rows};
use fluentsql::prelude::*;
use fluentsql::{
    HookAction, QueryContext, QueryHook, QueryResult, QueryType, RepositoryConfig,
    SingleRowPolicy, TracingSqlHook, Value,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fluentsql::entity! {
    #[derive(Debug, Clone, PartialEq)]
    struct User in "users" {
        id: i64,
        display: String => "name",
    }
}

fn by_age() -> NamedSelect {
    NamedSelect::of(|s| {
        s.select(&["id", "name"])
            .from(&["users"])
            .and_where("age > :minAge");
        s.bind("minAge", 18);
    })
}

#[test]
fn named_scenario_reaches_collaborator_unchanged() {
    let repo = Repository::new(MockAccess::new().returns(user_rows(1, 2)));
    let users: Vec<User> = repo.query_list(&by_age()).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].display, "user2");

    let call = &repo.access().calls()[0];
    assert_eq!(call.sql, "SELECT id, name FROM users WHERE age > :minAge");
    assert_eq!(call.params, ParameterSet::named_from([("minAge", 18)]));
}

#[test]
fn indexed_scenario_keeps_parameter_order() {
    let mut q = IndexedSelect::new();
    q.from(&["users"])
        .and_where_bind("id = ?", [1])
        .and_where_bind("id = ?", [2]);
    let repo = Repository::new(MockAccess::new());
    repo.query_list_map(&q).unwrap();

    let call = &repo.access().calls()[0];
    assert_eq!(call.sql, "SELECT * FROM users WHERE id = ? AND id = ?");
    assert_eq!(call.params, ParameterSet::indexed_from([1, 2]));
}

#[test]
fn empty_result_is_empty_list() {
    let repo = Repository::new(MockAccess::new());
    let users: Vec<User> = repo.query_list(&by_age()).unwrap();
    assert!(users.is_empty());
}

#[test]
fn object_is_none_without_rows() {
    let repo = Repository::new(MockAccess::new());
    assert_eq!(repo.query_object::<User>(&by_age()).unwrap(), None);
    assert_eq!(repo.query_object_map(&by_age()).unwrap(), None);
}

#[test]
fn object_takes_first_row_by_default() {
    let repo = Repository::new(MockAccess::new().returns(user_rows(5, 3)));
    let user = repo.query_object::<User>(&by_age()).unwrap().unwrap();
    assert_eq!(user.id, 5);
}

#[test]
fn strict_policy_rejects_many_rows() {
    let repo = Repository::new(MockAccess::new().returns(user_rows(5, 3)))
        .with_config(RepositoryConfig::new().single_row(SingleRowPolicy::Strict));
    let err = repo.query_object::<User>(&by_age()).unwrap_err();
    assert!(matches!(err, SqlError::TooManyRows { expected: 1, got: 3 }));
}

#[test]
fn unbound_name_fails_before_io() {
    let mut q = NamedSelect::new();
    q.from(&["users"]).and_where("age > :minAge AND city = :city");
    q.bind("minAge", 18);
    let repo = Repository::new(MockAccess::new());
    let err = repo.query_list_map(&q).unwrap_err();
    assert!(err.is_bind());
    assert!(err.to_string().contains(":city"));
    assert!(repo.access().calls().is_empty());
}

#[test]
fn build_error_fails_before_io() {
    let mut q = IndexedSelect::new();
    q.from(&["users"]).and_where_bind("a = ? AND b = ?", [1]);
    let repo = Repository::new(MockAccess::new());
    assert!(repo.query_rows(&q).unwrap_err().is_build());
    assert!(repo.access().calls().is_empty());
}

#[test]
fn raw_indexed_count_mismatch_is_bind_error() {
    let repo = Repository::new(MockAccess::new());
    let q = RawSql::indexed("SELECT * FROM t WHERE a = ? AND b = ?", [1]);
    assert!(repo.query_rows(&q).unwrap_err().is_bind());
}

#[test]
fn single_column_list() {
    let rows = vec![
        Row::from_pairs([("id", Value::I64(3))]),
        Row::from_pairs([("id", Value::I64(4))]),
    ];
    let repo = Repository::new(MockAccess::new().returns(rows));
    let ids: Vec<i64> = repo.query_list_single(&"SELECT id FROM users").unwrap();
    assert_eq!(ids, vec![3, 4]);
}

#[test]
fn list_with_closure_mapper() {
    let repo = Repository::new(MockAccess::new().returns(user_rows(1, 3)));
    let names = repo
        .query_list_with(&by_age(), |row: &Row| row.try_get::<String>("name"))
        .unwrap();
    assert_eq!(names, vec!["user1", "user2", "user3"]);
}

#[test]
fn list_range_bounds_statement() {
    let repo = Repository::new(MockAccess::new());
    repo.query_list_range::<User>(&by_age(), 40, 20).unwrap();
    repo.query_list_limit::<User>(&by_age(), 5).unwrap();
    assert_eq!(
        repo.access().sqls(),
        vec![
            "SELECT id, name FROM users WHERE age > :minAge LIMIT 20 OFFSET 40".to_string(),
            "SELECT id, name FROM users WHERE age > :minAge LIMIT 5 OFFSET 0".to_string(),
        ]
    );
}

#[test]
fn map_rows_keep_column_order() {
    let repo = Repository::new(MockAccess::new().returns(user_rows(1, 1)));
    let maps = repo.query_list_map(&by_age()).unwrap();
    assert_eq!(maps[0].keys().collect::<Vec<_>>(), vec!["id", "name"]);
}

#[test]
fn decode_error_surfaces() {
    let rows = vec![Row::from_pairs([("id", Value::from("abc")), ("name", Value::from("x"))])];
    let repo = Repository::new(MockAccess::new().returns(rows));
    let err = repo.query_list::<User>(&by_age()).unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn scalars() {
    let repo = Repository::new(
        MockAccess::new()
            .returns(vec![Row::from_pairs([("n", Value::I64(42))])])
            .returns(vec![Row::from_pairs([("s", Value::Null)])])
            .returns(vec![])
            .returns(vec![Row::from_pairs([("b", Value::Bool(true))])]),
    );
    assert_eq!(repo.query_long(&"SELECT COUNT(*) FROM t").unwrap(), Some(42));
    assert_eq!(repo.query_string(&"SELECT NULL").unwrap(), None);
    assert_eq!(repo.query_int(&"SELECT 1 WHERE false").unwrap(), None);
    assert_eq!(repo.query_boolean(&"SELECT true").unwrap(), Some(true));
}

#[test]
fn execute_returns_affected_rows() {
    let mut update = UpdateSql::<Named>::table("users");
    update.set("name", "bob").and_eq("id", 7_i64);
    let repo = Repository::new(MockAccess::new().affects(1));
    assert_eq!(repo.execute(&update).unwrap(), 1);
    assert_eq!(
        repo.access().sqls(),
        vec!["UPDATE users SET name = :name WHERE id = :id".to_string()]
    );
}

#[test]
fn delete_without_where_never_executes() {
    let delete = DeleteSql::<Indexed>::from_table("users");
    let repo = Repository::new(MockAccess::new());
    assert!(repo.execute(&delete).unwrap_err().is_build());
    assert!(repo.access().calls().is_empty());
}

#[test]
fn batch_validates_every_set_first() {
    let repo = Repository::new(MockAccess::new().affects(1).affects(1));
    let sql = "INSERT INTO users (id, name) VALUES (:id, :name)";
    let ok = vec![
        ParameterSet::named().with("id", 1).with("name", "a"),
        ParameterSet::named().with("id", 2).with("name", "b"),
    ];
    assert_eq!(repo.execute_batch(sql, &ok).unwrap(), vec![1, 1]);

    let bad = vec![
        ParameterSet::named().with("id", 3).with("name", "c"),
        ParameterSet::named().with("id", 4),
    ];
    assert!(repo.execute_batch(sql, &bad).unwrap_err().is_bind());
    assert_eq!(repo.access().calls().len(), 2);
}

#[test]
fn batch_from_built_insert_renders_once() {
    let mut template = InsertSql::<Named>::into_table("users");
    template.value("id", 0_i64).value("name", "");
    let batch = vec![
        ParameterSet::named().with("id", 1).with("name", "a"),
        ParameterSet::named().with("id", 2).with("name", "b"),
    ];
    let repo = Repository::new(MockAccess::new().affects(1).affects(1));
    assert_eq!(repo.execute_batch_statement(&template, &batch).unwrap(), vec![1, 1]);

    let sql = "INSERT INTO users (id, name) VALUES (:id, :name)".to_string();
    assert_eq!(repo.access().sqls(), vec![sql.clone(), sql]);
    assert_eq!(repo.access().calls()[1].params, batch[1]);

    // a template that does not render never reaches the collaborator
    let empty = InsertSql::<Named>::into_table("users");
    assert!(repo.execute_batch_statement(&empty, &batch).unwrap_err().is_build());
    assert_eq!(repo.access().calls().len(), 2);
}

#[test]
fn collaborator_failure_keeps_source() {
    let repo = Repository::new(MockAccess::new().fails("connection reset"));
    let err = repo.query_rows(&by_age()).unwrap_err();
    assert!(matches!(err, SqlError::Execution(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<(QueryType, Option<String>, String)>>>,
}

impl QueryHook for Recorder {
    fn after_query(&self, ctx: &QueryContext, _duration: Duration, result: &QueryResult) {
        self.seen
            .lock()
            .unwrap()
            .push((ctx.query_type, ctx.tag.clone(), result.to_string()));
    }
}

#[test]
fn hooks_see_every_statement() {
    let recorder = Recorder::default();
    let repo = Repository::new(MockAccess::new().returns(user_rows(1, 2)).affects(3))
        .with_config(
            RepositoryConfig::new()
                .tag("users-api")
                .slow_query_threshold(Duration::from_secs(60)),
        )
        .with_hook(TracingSqlHook::new())
        .with_hook(recorder.clone());

    repo.query_list_map(&by_age()).unwrap();
    repo.execute(&RawSql::indexed("DELETE FROM users WHERE id = ?", [9]))
        .unwrap();

    let seen = recorder.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            (QueryType::Select, Some("users-api".to_string()), "2 rows".to_string()),
            (QueryType::Delete, Some("users-api".to_string()), "3 affected".to_string()),
        ]
    );
}

struct ReadOnly;

impl QueryHook for ReadOnly {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        match ctx.query_type {
            QueryType::Select => HookAction::Continue,
            _ => HookAction::Abort("read-only repository".to_string()),
        }
    }
}

#[test]
fn hook_can_abort() {
    let repo = Repository::new(MockAccess::new()).with_hook(ReadOnly);
    let err = repo.execute(&"DELETE FROM users").unwrap_err();
    assert!(matches!(err, SqlError::Aborted(_)));
    assert!(repo.access().calls().is_empty());
    assert!(repo.query_rows(&"SELECT 1").is_ok());
}
