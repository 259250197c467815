//! Parameter sets and placeholder binding.
//!
//! Two disciplines exist and never mix within one statement:
//!
//! - **Named**: `:identifier` tokens, values looked up by name.
//! - **Indexed**: plain `?` tokens, the Nth value binds the Nth `?`.
//!
//! [`validate`] checks a rendered SQL string against its [`ParameterSet`]
//! before anything is sent to the database. [`to_numbered`] rewrites either
//! discipline into Postgres-style `$1, $2, ...` for drivers that need it.

use crate::error::{SqlError, SqlResult};
use crate::value::{Value, ValueKind};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// A bound parameter value with an optional explicit type hint.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    pub value: Value,
    /// Explicit type, required for typed NULLs.
    pub kind: Option<ValueKind>,
}

impl BoundValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            kind: None,
        }
    }

    /// A NULL with an explicit SQL type.
    pub fn null(kind: ValueKind) -> Self {
        Self {
            value: Value::Null,
            kind: Some(kind),
        }
    }

    pub fn typed(value: impl Into<Value>, kind: ValueKind) -> Self {
        Self {
            value: value.into(),
            kind: Some(kind),
        }
    }

    /// The explicit hint, falling back to the value's own type.
    pub fn effective_kind(&self) -> Option<ValueKind> {
        self.kind.or_else(|| self.value.kind())
    }
}

impl From<Value> for BoundValue {
    fn from(value: Value) -> Self {
        Self { value, kind: None }
    }
}

macro_rules! impl_from_for_bound {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for BoundValue {
                fn from(v: $ty) -> Self {
                    Self::new(v)
                }
            }
        )*
    };
}

impl_from_for_bound!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    rust_decimal::Decimal,
    String,
    &str,
    &String,
    Vec<u8>,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    uuid::Uuid,
    serde_json::Value,
);

impl<T: Into<Value>> From<Option<T>> for BoundValue {
    fn from(v: Option<T>) -> Self {
        Self::new(v)
    }
}

/// The parameters of one statement execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSet {
    /// Name → value. Names are unique, the last write wins.
    Named(BTreeMap<String, BoundValue>),
    /// One value per `?`, in rendered order.
    Indexed(Vec<BoundValue>),
}

impl ParameterSet {
    pub fn named() -> Self {
        Self::Named(BTreeMap::new())
    }

    pub fn indexed() -> Self {
        Self::Indexed(Vec::new())
    }

    /// Build a named set from `(name, value)` pairs.
    pub fn named_from<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), BoundValue::new(v)))
                .collect(),
        )
    }

    /// Build an indexed set from values in placeholder order.
    pub fn indexed_from<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Indexed(values.into_iter().map(BoundValue::new).collect())
    }

    /// Chainable named insert. On an indexed set the value is appended instead.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, BoundValue::new(value));
        self
    }

    /// Insert a named value (last write wins). On an indexed set the value is appended.
    pub fn insert(&mut self, name: &str, value: BoundValue) {
        match self {
            Self::Named(map) => {
                map.insert(name.to_string(), value);
            }
            Self::Indexed(list) => list.push(value),
        }
    }

    /// Append a positional value. On a named set the value is stored under its ordinal.
    pub fn push(&mut self, value: BoundValue) {
        match self {
            Self::Named(map) => {
                let key = map.len().to_string();
                map.insert(key, value);
            }
            Self::Indexed(list) => list.push(value),
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Named(map) => map.len(),
            Self::Indexed(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Named lookup; always `None` for indexed sets.
    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        match self {
            Self::Named(map) => map.get(name),
            Self::Indexed(_) => None,
        }
    }

    /// Values in their natural order (name order for named sets).
    pub fn values(&self) -> Vec<&BoundValue> {
        match self {
            Self::Named(map) => map.values().collect(),
            Self::Indexed(list) => list.iter().collect(),
        }
    }
}

/// A placeholder found in SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder<'a> {
    /// `?`
    Positional,
    /// `:name` (the name without the colon)
    Named(&'a str),
}

/// A placeholder and its byte span in the source SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSpan<'a> {
    pub start: usize,
    pub end: usize,
    pub placeholder: Placeholder<'a>,
}

fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_ident_char(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

/// Find every placeholder in `sql`.
///
/// String literals (including `E'..'` with backslash escapes and `$tag$..$tag$`
/// dollar quotes), quoted identifiers, comments and `::` casts are skipped.
pub fn scan_placeholders(sql: &str) -> Vec<PlaceholderSpan<'_>> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let word_start = i == 0 || !is_ident_char(bytes[i - 1]);
        match bytes[i] {
            b'E' | b'e' if word_start && bytes.get(i + 1) == Some(&b'\'') => {
                i += 2;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'\'' if bytes.get(i + 1) == Some(&b'\'') => i += 2,
                        b'\'' => break,
                        _ => i += 1,
                    }
                }
                i += 1;
            }
            b'$' if word_start => match dollar_tag(&bytes[i..]) {
                Some(tag_len) => {
                    let tag = &sql[i..i + tag_len];
                    let body = i + tag_len;
                    i = match sql[body..].find(tag) {
                        Some(pos) => body + pos + tag_len,
                        None => bytes.len(),
                    };
                }
                None => i += 1,
            },
            b'\'' | b'"' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        if i + 1 < bytes.len() && bytes[i + 1] == quote {
                            i += 2; // escaped quote
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = match sql[i..].find('\n') {
                    Some(pos) => i + pos + 1,
                    None => bytes.len(),
                };
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = match sql[i + 2..].find("*/") {
                    Some(pos) => i + 2 + pos + 2,
                    None => bytes.len(),
                };
            }
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes.get(i + 1).copied().is_some_and(is_ident_start) => {
                let start = i;
                i += 1;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                out.push(PlaceholderSpan {
                    start,
                    end: i,
                    placeholder: Placeholder::Named(&sql[start + 1..i]),
                });
            }
            b'?' => {
                out.push(PlaceholderSpan {
                    start: i,
                    end: i + 1,
                    placeholder: Placeholder::Positional,
                });
                i += 1;
            }
            _ => i += 1,
        }
    }
    out
}

/// Length of the `$tag$` opening a dollar-quoted string, tag possibly empty.
/// `$1` style parameters are not dollar quotes.
fn dollar_tag(bytes: &[u8]) -> Option<usize> {
    match bytes.get(1) {
        Some(b'$') => Some(2),
        Some(&b) if is_ident_start(b) => {
            let mut end = 2;
            while end < bytes.len() && is_ident_char(bytes[end]) {
                end += 1;
            }
            (bytes.get(end) == Some(&b'$')).then_some(end + 1)
        }
        _ => None,
    }
}

/// Number of `?` placeholders in `sql`.
pub fn count_positional(sql: &str) -> usize {
    scan_placeholders(sql)
        .iter()
        .filter(|s| s.placeholder == Placeholder::Positional)
        .count()
}

/// Names referenced by `:name` placeholders, in order of appearance (with repeats).
pub fn named_placeholders(sql: &str) -> Vec<&str> {
    scan_placeholders(sql)
        .into_iter()
        .filter_map(|s| match s.placeholder {
            Placeholder::Named(name) => Some(name),
            Placeholder::Positional => None,
        })
        .collect()
}

/// Check that `sql` and `params` agree.
///
/// - Indexed: no `:name` tokens, and the `?` count equals the value count.
/// - Named: no `?` tokens, and every `:name` is bound. Unreferenced names are allowed.
pub fn validate(sql: &str, params: &ParameterSet) -> SqlResult<()> {
    let spans = scan_placeholders(sql);
    match params {
        ParameterSet::Indexed(values) => {
            let mut positional = 0;
            for span in &spans {
                match span.placeholder {
                    Placeholder::Positional => positional += 1,
                    Placeholder::Named(name) => {
                        return Err(SqlError::bind(format!(
                            "named placeholder ':{}' in an indexed statement",
                            name
                        )));
                    }
                }
            }
            if positional != values.len() {
                return Err(SqlError::bind(format!(
                    "statement has {} '?' placeholder(s) but {} parameter(s) were bound",
                    positional,
                    values.len()
                )));
            }
        }
        ParameterSet::Named(map) => {
            for span in &spans {
                match span.placeholder {
                    Placeholder::Positional => {
                        return Err(SqlError::bind(
                            "positional '?' placeholder in a named statement",
                        ));
                    }
                    Placeholder::Named(name) => {
                        if !map.contains_key(name) {
                            return Err(SqlError::bind(format!(
                                "parameter ':{}' is not bound",
                                name
                            )));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Rewrite `sql` to `$1, $2, ...` placeholders and return the values in that order.
///
/// A name used several times keeps the number of its first occurrence. A NULL
/// bound with an explicit [`ValueKind`] is written as `$n::<type>` so the
/// server types the parameter from the hint rather than from its context.
pub fn to_numbered(sql: &str, params: &ParameterSet) -> SqlResult<(String, Vec<BoundValue>)> {
    validate(sql, params)?;

    let spans = scan_placeholders(sql);
    let mut out = String::with_capacity(sql.len() + spans.len() * 2);
    let mut ordered: Vec<BoundValue> = Vec::with_capacity(spans.len());
    let mut numbers: HashMap<&str, usize> = HashMap::new();
    let mut last = 0;

    for span in &spans {
        out.push_str(&sql[last..span.start]);
        let n = match (span.placeholder, params) {
            (Placeholder::Positional, ParameterSet::Indexed(values)) => {
                ordered.push(values[ordered.len()].clone());
                ordered.len()
            }
            (Placeholder::Named(name), ParameterSet::Named(map)) => {
                *numbers.entry(name).or_insert_with(|| {
                    ordered.push(map[name].clone());
                    ordered.len()
                })
            }
            // validate() rejects mixed disciplines.
            _ => unreachable!("placeholder discipline mismatch after validation"),
        };
        use std::fmt::Write;
        let _ = write!(&mut out, "${}", n);
        let bound = &ordered[n - 1];
        if let (Value::Null, Some(kind)) = (&bound.value, bound.kind) {
            let _ = write!(&mut out, "::{}", kind.sql_type());
        }
        last = span.end;
    }
    out.push_str(&sql[last..]);
    Ok((out, ordered))
}
