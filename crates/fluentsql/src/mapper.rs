//! Row mapping strategies.

use crate::error::{SqlError, SqlResult};
use crate::row::{FromRow, Row, RowMap};
use crate::value::FromValue;
use std::marker::PhantomData;

/// Turns one result row into a `T`.
///
/// Any `Fn(&Row) -> SqlResult<T>` is a mapper, so callers can pass closures.
pub trait RowMapper<T> {
    fn map_row(&self, row: &Row) -> SqlResult<T>;
}

impl<T, F> RowMapper<T> for F
where
    F: Fn(&Row) -> SqlResult<T>,
{
    fn map_row(&self, row: &Row) -> SqlResult<T> {
        self(row)
    }
}

/// Maps rows through the type's [`FromRow`] impl (usually generated by
/// [`entity!`](crate::entity!)).
pub struct BeanMapper<T>(PhantomData<fn() -> T>);

impl<T> BeanMapper<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for BeanMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromRow> RowMapper<T> for BeanMapper<T> {
    fn map_row(&self, row: &Row) -> SqlResult<T> {
        T::from_row(row)
    }
}

/// Maps the first column of each row.
pub struct SingleColumnMapper<T>(PhantomData<fn() -> T>);

impl<T> SingleColumnMapper<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for SingleColumnMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromValue> RowMapper<T> for SingleColumnMapper<T> {
    fn map_row(&self, row: &Row) -> SqlResult<T> {
        if row.is_empty() {
            return Err(SqlError::decode("#0", "row has no columns"));
        }
        row.try_get_at(0)
    }
}

/// Maps each row to an ordered column → value map.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapMapper;

impl RowMapper<RowMap> for MapMapper {
    fn map_row(&self, row: &Row) -> SqlResult<RowMap> {
        Ok(row.clone().into_map())
    }
}
