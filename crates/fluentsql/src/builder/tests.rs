use super::*;
use crate::params::{self, ParameterSet};
use crate::statement::Statement;
use crate::value::Value;

crate::entity! {
    #[derive(Debug)]
    struct Member in "members" {
        id: i64,
        display_name: String => "name",
    }
}

#[test]
fn test_named_select_scenario() {
    let q = NamedSelect::of(|s| {
        s.select(&["id", "name"])
            .from(&["users"])
            .and_where("age > :minAge");
        s.bind("minAge", 18);
    });
    let rendered = q.render().unwrap();
    assert_eq!(rendered.sql, "SELECT id, name FROM users WHERE age > :minAge");
    assert_eq!(rendered.params, ParameterSet::named_from([("minAge", 18)]));
}

#[test]
fn test_indexed_where_twice() {
    let mut q = IndexedSelect::new();
    q.from(&["users"])
        .and_where_bind("id = ?", [1])
        .and_where_bind("id = ?", [2]);
    let rendered = q.render().unwrap();
    assert_eq!(rendered.sql, "SELECT * FROM users WHERE id = ? AND id = ?");
    assert_eq!(rendered.params, ParameterSet::indexed_from([1, 2]));
}

#[test]
fn test_select_star_when_no_columns() {
    let mut q = NamedSelect::new();
    q.from(&["users"]);
    assert_eq!(q.to_sql(), "SELECT * FROM users");
}

#[test]
fn test_clause_order_is_fixed() {
    let mut a = NamedSelect::new();
    a.select(&["dept", "COUNT(*)"])
        .from(&["emp e"])
        .left_join("dept d ON d.id = e.dept_id")
        .and_where("e.active = :active")
        .group_by(&["dept"])
        .having("COUNT(*) > 1")
        .order_by_desc(&["dept"])
        .limit(10)
        .offset(20);

    let mut b = NamedSelect::new();
    b.offset(20)
        .limit(10)
        .order_by_desc(&["dept"])
        .having("COUNT(*) > 1")
        .group_by(&["dept"])
        .and_where("e.active = :active")
        .left_join("dept d ON d.id = e.dept_id")
        .from(&["emp e"])
        .select(&["dept", "COUNT(*)"]);

    let expected = "SELECT dept, COUNT(*) FROM emp e LEFT JOIN dept d ON d.id = e.dept_id \
                    WHERE e.active = :active GROUP BY dept HAVING COUNT(*) > 1 \
                    ORDER BY dept DESC LIMIT 10 OFFSET 20";
    assert_eq!(a.to_sql(), expected);
    assert_eq!(b.to_sql(), expected);
}

#[test]
fn test_render_is_idempotent() {
    let mut q = IndexedSelect::new();
    q.from(&["t"]).and_where_bind("a = ?", [1]).order_by(&["a"]);
    assert_eq!(q.to_sql(), q.to_sql());
    assert_eq!(q.render().unwrap(), q.render().unwrap());
}

#[test]
fn test_repeated_select_appends() {
    let mut q = NamedSelect::new();
    q.select(&["a"]).select(&["b", "c"]).from(&["t"]);
    assert_eq!(q.to_sql(), "SELECT a, b, c FROM t");
}

#[test]
fn test_from_is_comma_joined() {
    let mut q = NamedSelect::new();
    q.from(&["a", "b"]).from(&["c"]);
    assert_eq!(q.to_sql(), "SELECT * FROM a, b, c");
}

#[test]
fn test_join_kinds() {
    let mut q = NamedSelect::new();
    q.from(&["t1"])
        .join("t2 ON t1.id = t2.fk")
        .inner_join("t3 ON t1.id = t3.fk")
        .left_join("t4 ON t1.id = t4.fk")
        .right_join("t5 ON t1.id = t5.fk")
        .left_outer_join("t6 ON t1.id = t6.fk")
        .right_outer_join("t7 ON t1.id = t7.fk")
        .cross_join("t8");
    assert_eq!(
        q.to_sql(),
        "SELECT * FROM t1 JOIN t2 ON t1.id = t2.fk INNER JOIN t3 ON t1.id = t3.fk \
         LEFT JOIN t4 ON t1.id = t4.fk RIGHT JOIN t5 ON t1.id = t5.fk \
         LEFT OUTER JOIN t6 ON t1.id = t6.fk RIGHT OUTER JOIN t7 ON t1.id = t7.fk \
         CROSS JOIN t8"
    );
}

#[test]
fn test_order_by_entries() {
    let mut q = NamedSelect::new();
    q.from(&["t"])
        .order_by_asc(&["a"])
        .order_by_desc(&["b"])
        .order_by(&["c NULLS LAST"]);
    assert_eq!(
        q.to_sql(),
        "SELECT * FROM t ORDER BY a ASC, b DESC, c NULLS LAST"
    );
}

#[test]
fn test_indexed_params_follow_rendered_order() {
    let mut q = IndexedSelect::new();
    q.from(&["t"])
        .and_where_bind("id = ?", [1])
        .select_bind("? AS flag", [true]);
    let rendered = q.render().unwrap();
    assert_eq!(rendered.sql, "SELECT ? AS flag FROM t WHERE id = ?");
    assert_eq!(
        rendered.params,
        ParameterSet::Indexed(vec![true.into(), 1.into()])
    );
    assert_eq!(params::count_positional(&rendered.sql), rendered.params.len());
}

#[test]
fn test_join_bind_values() {
    let mut q = IndexedSelect::new();
    q.from(&["orders o"])
        .join_bind(JoinKind::Left, "items i ON i.order_id = o.id AND i.qty > ?", [5])
        .and_where_bind("o.status = ?", ["open"]);
    let rendered = q.render().unwrap();
    assert_eq!(
        rendered.sql,
        "SELECT * FROM orders o LEFT JOIN items i ON i.order_id = o.id AND i.qty > ? \
         WHERE o.status = ?"
    );
    assert_eq!(rendered.params.len(), 2);
}

#[test]
fn test_indexed_count_mismatch_is_build_error() {
    let mut q = IndexedSelect::new();
    q.from(&["t"]).and_where_bind("a = ? AND b = ?", [1]);
    let err = q.render().unwrap_err();
    assert!(err.is_build());
    assert!(err.to_string().contains("has 2 '?', but 1 values provided"));
}

#[test]
fn test_named_placeholder_rejected_in_indexed_builder() {
    let mut q = IndexedSelect::new();
    q.from(&["t"]).and_where("a = :a");
    assert!(q.render().unwrap_err().is_build());
}

#[test]
fn test_positional_placeholder_rejected_in_named_builder() {
    let mut q = NamedSelect::new();
    q.from(&["t"]).and_where("a = ?");
    assert!(q.render().unwrap_err().is_build());
}

#[test]
fn test_first_build_error_wins() {
    let mut q = IndexedSelect::new();
    q.from(&["t"])
        .and_where_bind("a = ?", Vec::<i32>::new())
        .and_where("b = :b");
    let err = q.render().unwrap_err();
    assert!(err.to_string().contains("'a = ?'"));
}

#[test]
fn test_empty_statement_is_build_error() {
    assert!(NamedSelect::new().render().unwrap_err().is_build());
}

#[test]
fn test_count_replaces_select_and_drops_order_and_limit() {
    let mut q = NamedSelect::new();
    q.select(&["id", "name"])
        .from(&["users"])
        .and_where("age > :minAge")
        .order_by_asc(&["name"])
        .limit(10)
        .offset(30);
    q.bind("minAge", 18);
    let count = q.render_count().unwrap();
    assert_eq!(count.sql, "SELECT COUNT(*) FROM users WHERE age > :minAge");
    assert_eq!(count.params.get("minAge").map(|b| &b.value), Some(&Value::I32(18)));
}

#[test]
fn test_count_of_grouped_query_counts_groups() {
    let mut q = IndexedSelect::new();
    q.select(&["dept", "COUNT(*) AS n"])
        .from(&["emp"])
        .and_where_bind("salary > ?", [1000])
        .group_by(&["dept"])
        .order_by_asc(&["dept"]);
    let count = q.render_count().unwrap();
    assert_eq!(
        count.sql,
        "SELECT COUNT(*) FROM (SELECT dept, COUNT(*) AS n FROM emp WHERE salary > ? GROUP BY dept) AS t"
    );
    assert_eq!(count.params, ParameterSet::indexed_from([1000]));
}

#[test]
fn test_count_of_distinct_query_uses_subquery() {
    let mut q = NamedSelect::new();
    q.select(&["DISTINCT city"]).from(&["users"]);
    assert_eq!(
        q.to_count_sql(),
        "SELECT COUNT(*) FROM (SELECT DISTINCT city FROM users) AS t"
    );
}

#[test]
fn test_count_of_aggregate_list_uses_subquery() {
    let mut q = NamedSelect::new();
    q.select(&["MAX(age) AS oldest"]).from(&["users"]);
    assert_eq!(
        q.to_count_sql(),
        "SELECT COUNT(*) FROM (SELECT MAX(age) AS oldest FROM users) AS t"
    );

    // window calls and look-alike names keep the plain count
    let mut q = NamedSelect::new();
    q.select(&["id", "SUM(amount) OVER (PARTITION BY acct) AS running", "maxed"])
        .from(&["ledger"]);
    assert_eq!(q.to_count_sql(), "SELECT COUNT(*) FROM ledger");

    let mut q = NamedSelect::new();
    q.select(&["id", "'avg(x)' AS label", "u.count"]).from(&["users u"]);
    assert_eq!(q.to_count_sql(), "SELECT COUNT(*) FROM users u");
}

#[test]
fn test_unbounded_render_drops_limit() {
    let mut q = NamedSelect::new();
    q.from(&["t"]).order_by_asc(&["id"]).limit(5).offset(10);
    assert_eq!(
        q.render_unbounded().unwrap().sql,
        "SELECT * FROM t ORDER BY id ASC"
    );
}

#[test]
fn test_predicate_or_group_is_parenthesised() {
    let mut q = NamedSelect::new();
    q.from(&["users"])
        .and_where("deleted = false")
        .and_where_with(|p| {
            p.and_eq("status", "active").or_eq("role", "admin");
        });
    let rendered = q.render().unwrap();
    assert_eq!(
        rendered.sql,
        "SELECT * FROM users WHERE deleted = false AND (status = :status OR role = :role)"
    );
    assert_eq!(rendered.params.len(), 2);
}

#[test]
fn test_indexed_predicate_groups() {
    let mut q = IndexedSelect::new();
    q.from(&["t"]).and_where_with(|p| {
        p.and_bind("a = ?", [1]).and_group(|g| {
            g.and_bind("b = ?", [2]).or_bind("c = ?", [3]);
        });
    });
    let rendered = q.render().unwrap();
    assert_eq!(rendered.sql, "SELECT * FROM t WHERE a = ? AND (b = ? OR c = ?)");
    assert_eq!(rendered.params, ParameterSet::indexed_from([1, 2, 3]));
}

#[test]
fn test_predicate_error_propagates() {
    let mut q = IndexedSelect::new();
    q.from(&["t"]).having_with(|p| {
        p.and_bind("n > ? AND n < ?", [1]);
    });
    assert!(q.render().unwrap_err().is_build());
}

#[test]
fn test_named_bind_last_write_wins() {
    let mut q = NamedSelect::new();
    q.from(&["t"]).and_where("a = :a");
    q.bind("a", 1).bind("a", 2);
    assert_eq!(
        q.parameters().get("a").map(|b| &b.value),
        Some(&Value::I32(2))
    );
}

#[test]
fn test_named_where_bind_pairs() {
    let mut q = NamedSelect::new();
    q.from(&["t"])
        .and_where_bind("a BETWEEN :lo AND :hi", [("lo", 1), ("hi", 9)]);
    let rendered = q.render().unwrap();
    assert_eq!(rendered.params.len(), 2);
    assert!(params::validate(&rendered.sql, &rendered.params).is_ok());
}

#[test]
fn test_typed_null_bind() {
    let mut q = NamedSelect::new();
    q.from(&["t"]).and_where("a IS NOT DISTINCT FROM :a");
    q.bind_null("a", crate::value::ValueKind::Text);
    let bound = q.parameters().get("a").cloned().unwrap();
    assert!(bound.value.is_null());
    assert_eq!(bound.kind, Some(crate::value::ValueKind::Text));
}

#[test]
fn test_select_from_entity() {
    let mut q = NamedSelect::new();
    q.select_from::<Member>().and_where("id = :id");
    assert_eq!(q.to_sql(), "SELECT id, name FROM members WHERE id = :id");
}

#[test]
fn test_insert_indexed() {
    let mut insert = InsertSql::<Indexed>::into_table("users");
    insert.value("name", "alice").value("age", 30);
    let rendered = insert.render().unwrap();
    assert_eq!(rendered.sql, "INSERT INTO users (name, age) VALUES (?, ?)");
    assert_eq!(
        rendered.params,
        ParameterSet::Indexed(vec!["alice".into(), 30.into()])
    );
}

#[test]
fn test_insert_named_with_raw_and_returning() {
    let mut insert = InsertSql::<Named>::into_entity::<Member>();
    insert
        .value("name", "bob")
        .value_opt("nickname", None::<String>)
        .value_raw("created_at", "now()")
        .returning(&["id"]);
    let rendered = insert.render().unwrap();
    assert_eq!(
        rendered.sql,
        "INSERT INTO members (name, created_at) VALUES (:name, now()) RETURNING id"
    );
    assert_eq!(rendered.params, ParameterSet::named_from([("name", "bob")]));
}

#[test]
fn test_insert_without_columns_fails() {
    let insert = InsertSql::<Named>::into_table("users");
    assert!(insert.render().unwrap_err().is_build());
}

#[test]
fn test_update_named() {
    let mut update = UpdateSql::<Named>::table("users");
    update
        .set("name", "bob")
        .set_raw("version", "version + 1")
        .and_eq("id", 7_i64);
    let rendered = update.render().unwrap();
    assert_eq!(
        rendered.sql,
        "UPDATE users SET name = :name, version = version + 1 WHERE id = :id"
    );
    assert_eq!(rendered.params.len(), 2);
    assert!(params::validate(&rendered.sql, &rendered.params).is_ok());
}

#[test]
fn test_update_indexed_params_in_order() {
    let mut update = UpdateSql::<Indexed>::table("users");
    update
        .and_where_bind("id = ?", [7])
        .set("name", "bob")
        .set("age", 40);
    let rendered = update.render().unwrap();
    assert_eq!(rendered.sql, "UPDATE users SET name = ?, age = ? WHERE id = ?");
    assert_eq!(
        rendered.params,
        ParameterSet::Indexed(vec!["bob".into(), 40.into(), 7.into()])
    );
}

#[test]
fn test_update_requires_where_unless_allowed() {
    let mut update = UpdateSql::<Indexed>::table("users");
    update.set("active", false);
    assert!(update.render().unwrap_err().is_build());
    update.allow_all();
    assert_eq!(update.render().unwrap().sql, "UPDATE users SET active = ?");
}

#[test]
fn test_update_requires_set() {
    let mut update = UpdateSql::<Named>::table("users");
    update.and_where("id = :id").bind("id", 1);
    assert!(update.render().unwrap_err().is_build());
}

#[test]
fn test_update_named_set_and_filter_same_column() {
    let mut update = UpdateSql::<Named>::table("jobs");
    update.set("status", "done").and_eq("status", "pending");
    let rendered = update.render().unwrap();
    assert_eq!(
        rendered.sql,
        "UPDATE jobs SET status = :status WHERE status = :status_1"
    );
    assert_eq!(
        rendered.params,
        ParameterSet::named_from([("status", "done"), ("status_1", "pending")])
    );
    params::validate(&rendered.sql, &rendered.params).unwrap();

    // a hand-bound name may not silently replace a SET value
    let mut update = UpdateSql::<Named>::table("jobs");
    update
        .set("status", "done")
        .and_where("status = :status")
        .bind("status", "pending");
    assert!(update.render().unwrap_err().is_build());
}

#[test]
fn test_named_repeated_column_gets_distinct_names() {
    let mut q = NamedSelect::new();
    q.from(&["orders"]).and_where_with(|p| {
        p.or_eq("status", "open").or_eq("status", "closed");
    });
    let rendered = q.render().unwrap();
    assert_eq!(
        rendered.sql,
        "SELECT * FROM orders WHERE (status = :status OR status = :status_1)"
    );
    assert_eq!(
        rendered.params,
        ParameterSet::named_from([("status", "open"), ("status_1", "closed")])
    );

    // a later callback and a nested group also stay clear of taken names
    q.and_where_with(|p| {
        p.and_eq("status", "held").or_group(|g| {
            g.and_eq("status", "void");
        });
    });
    let rendered = q.render().unwrap();
    assert_eq!(
        rendered.sql,
        "SELECT * FROM orders WHERE (status = :status OR status = :status_1) \
         AND (status = :status_2 OR (status = :status_3))"
    );
    assert_eq!(rendered.params.len(), 4);
    params::validate(&rendered.sql, &rendered.params).unwrap();
}

#[test]
fn test_delete_repeated_column_gets_distinct_names() {
    let mut delete = DeleteSql::<Named>::from_table("events");
    delete.and_eq("kind", "a").and_where_with(|p| {
        p.and_eq("kind", "b");
    });
    let rendered = delete.render().unwrap();
    assert_eq!(
        rendered.sql,
        "DELETE FROM events WHERE kind = :kind AND kind = :kind_1"
    );
    assert_eq!(
        rendered.params,
        ParameterSet::named_from([("kind", "a"), ("kind_1", "b")])
    );
}

#[test]
fn test_delete() {
    let mut delete = DeleteSql::<Indexed>::from_table("sessions");
    delete
        .and_where_bind("expires_at < ?", [1_700_000_000_i64])
        .and_where("revoked = true");
    let rendered = delete.render().unwrap();
    assert_eq!(
        rendered.sql,
        "DELETE FROM sessions WHERE expires_at < ? AND revoked = true"
    );
    assert_eq!(rendered.params.len(), 1);
}

#[test]
fn test_delete_without_where_fails() {
    let mut delete = DeleteSql::<Named>::from_table("logs");
    assert!(delete.render().unwrap_err().is_build());
    delete.allow_all();
    assert_eq!(delete.render().unwrap().sql, "DELETE FROM logs");
}
