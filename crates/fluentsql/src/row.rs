//! Result rows and row-to-struct mapping.

use crate::error::{SqlError, SqlResult};
use crate::value::{FromValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// One result row: column labels plus values, in select-list order.
///
/// Column labels are shared between the rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row. `values` must line up with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len(), "row width mismatch");
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(columns.into(), values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Position of a column label. Exact match wins, then ASCII case-insensitive.
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(column))
            })
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn get_by_name(&self, column: &str) -> Option<&Value> {
        self.index_of(column).map(|i| &self.values[i])
    }

    /// Typed access by column label, returning [`SqlError::Decode`] on failure.
    pub fn try_get<T: FromValue>(&self, column: &str) -> SqlResult<T> {
        let value = self
            .get_by_name(column)
            .ok_or_else(|| SqlError::decode(column, "column not found in result set"))?;
        T::from_value(value).map_err(|msg| SqlError::decode(column, msg))
    }

    /// Typed access by position.
    pub fn try_get_at<T: FromValue>(&self, idx: usize) -> SqlResult<T> {
        let Some(value) = self.values.get(idx) else {
            return Err(SqlError::decode(
                format!("#{}", idx),
                format!("row has {} column(s)", self.values.len()),
            ));
        };
        T::from_value(value).map_err(|msg| SqlError::decode(self.columns[idx].clone(), msg))
    }

    /// Convert into an ordered column map.
    pub fn into_map(self) -> RowMap {
        RowMap {
            entries: self.columns.iter().cloned().zip(self.values).collect(),
        }
    }
}

/// Column label → value for one row, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMap {
    entries: Vec<(String, Value)>,
}

impl RowMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for RowMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for RowMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Trait for converting a result row into a Rust struct.
///
/// Usually implemented through the [`entity!`](crate::entity!) macro.
pub trait FromRow: Sized {
    /// Convert a row into Self
    fn from_row(row: &Row) -> SqlResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> SqlResult<Self> {
        Ok(row.clone())
    }
}

impl FromRow for RowMap {
    fn from_row(row: &Row) -> SqlResult<Self> {
        Ok(row.clone().into_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::from_pairs([("id", Value::I64(1)), ("Name", Value::from("ada"))])
    }

    #[test]
    fn typed_access_by_name() {
        let row = sample();
        assert_eq!(row.try_get::<i64>("id").unwrap(), 1);
        assert_eq!(row.try_get::<String>("name").unwrap(), "ada");
    }

    #[test]
    fn missing_column_is_decode_error() {
        let err = sample().try_get::<i64>("age").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn type_mismatch_names_the_column() {
        match sample().try_get::<i64>("Name") {
            Err(SqlError::Decode { column, .. }) => assert_eq!(column, "Name"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn map_keeps_column_order() {
        let map = sample().into_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["id", "Name"]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"id":1,"Name":"ada"}"#
        );
    }
}
