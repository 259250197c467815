#![allow(dead_code)]

use fluentsql::{DataAccess, ParameterSet, Row, SqlError, SqlResult, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One call the repository made.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: ParameterSet,
}

/// In-memory collaborator: returns scripted results in order and records calls.
#[derive(Default)]
pub struct MockAccess {
    results: Mutex<VecDeque<SqlResult<Vec<Row>>>>,
    affected: Mutex<VecDeque<u64>>,
    calls: Mutex<Vec<Call>>,
}

impl MockAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows for the next query.
    pub fn returns(self, rows: Vec<Row>) -> Self {
        self.results.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn fails(self, message: &str) -> Self {
        let err = SqlError::execution(message.to_string());
        self.results.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn affects(self, n: u64) -> Self {
        self.affected.lock().unwrap().push_back(n);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sqls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.sql).collect()
    }

    fn record(&self, sql: &str, params: &ParameterSet) {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params: params.clone(),
        });
    }
}

impl DataAccess for MockAccess {
    fn execute(&self, sql: &str, params: &ParameterSet) -> SqlResult<u64> {
        self.record(sql, params);
        Ok(self.affected.lock().unwrap().pop_front().unwrap_or(0))
    }

    fn query(&self, sql: &str, params: &ParameterSet) -> SqlResult<Vec<Row>> {
        self.record(sql, params);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn count_row(n: i64) -> Row {
    Row::from_pairs([("count", Value::I64(n))])
}

/// `n` user rows with ids `start..start + n`.
pub fn user_rows(start: i64, n: i64) -> Vec<Row> {
    (start..start + n)
        .map(|id| {
            Row::from_pairs([
                ("id", Value::I64(id)),
                ("name", Value::from(format!("user{id}"))),
            ])
        })
        .collect()
}
