//! `Value` ⇄ tokio-postgres conversion.

use crate::error::{SqlError, SqlResult};
use crate::params::BoundValue;
use crate::row::Row;
use crate::value::{Value, ValueKind};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use std::sync::Arc;
use tokio_postgres::types::{IsNull, ToSql, Type};

type BoxError = Box<dyn Error + Sync + Send>;

fn wrong_type(what: &str, ty: &Type) -> BoxError {
    format!("cannot bind {} to a parameter of type {}", what, ty).into()
}

fn int_to_sql(n: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(n)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(n)?.to_sql(ty, out),
        Type::INT8 => n.to_sql(ty, out),
        Type::FLOAT4 => (n as f32).to_sql(ty, out),
        Type::FLOAT8 => (n as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::from(n).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => n.to_string().to_sql(ty, out),
        _ => Err(wrong_type("an integer", ty)),
    }
}

fn float_to_sql(n: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (n as f32).to_sql(ty, out),
        Type::FLOAT8 => n.to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from(n)?.to_sql(ty, out),
        _ => Err(wrong_type("a float", ty)),
    }
}

/// Parameter types a value of `kind` can be encoded as.
fn kind_accepts(kind: ValueKind, ty: &Type) -> bool {
    match kind {
        ValueKind::Bool => <bool as ToSql>::accepts(ty),
        ValueKind::SmallInt | ValueKind::Int | ValueKind::BigInt => matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::NUMERIC
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
        ),
        ValueKind::Real | ValueKind::Double => {
            matches!(*ty, Type::FLOAT4 | Type::FLOAT8 | Type::NUMERIC)
        }
        ValueKind::Numeric => <Decimal as ToSql>::accepts(ty),
        ValueKind::Text => <&str as ToSql>::accepts(ty),
        ValueKind::Bytes => <&[u8] as ToSql>::accepts(ty),
        ValueKind::Date => <chrono::NaiveDate as ToSql>::accepts(ty),
        ValueKind::Time => <chrono::NaiveTime as ToSql>::accepts(ty),
        ValueKind::Timestamp => <chrono::NaiveDateTime as ToSql>::accepts(ty),
        ValueKind::TimestampTz => <chrono::DateTime<chrono::Utc> as ToSql>::accepts(ty),
        ValueKind::Uuid => <uuid::Uuid as ToSql>::accepts(ty),
        ValueKind::Json => <serde_json::Value as ToSql>::accepts(ty),
    }
}

const KINDS: [ValueKind; 15] = [
    ValueKind::Bool,
    ValueKind::SmallInt,
    ValueKind::Int,
    ValueKind::BigInt,
    ValueKind::Real,
    ValueKind::Double,
    ValueKind::Numeric,
    ValueKind::Text,
    ValueKind::Bytes,
    ValueKind::Date,
    ValueKind::Time,
    ValueKind::Timestamp,
    ValueKind::TimestampTz,
    ValueKind::Uuid,
    ValueKind::Json,
];

/// Values are encoded for the parameter type the server inferred, so an `I32`
/// bound to a BIGINT column is widened instead of rejected. A value that has
/// no encoding for that type (or whose explicit kind does not match it) is an
/// error, never a reinterpretation of its bytes.
impl ToSql for BoundValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if let Some(kind) = self.effective_kind() {
            if !kind_accepts(kind, ty) {
                return Err(wrong_type(kind.sql_type(), ty));
            }
        }
        match &self.value {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::I16(v) => int_to_sql(i64::from(*v), ty, out),
            Value::I32(v) => int_to_sql(i64::from(*v), ty, out),
            Value::I64(v) => int_to_sql(*v, ty, out),
            Value::F32(v) => float_to_sql(f64::from(*v), ty, out),
            Value::F64(v) => float_to_sql(*v, ty, out),
            Value::Decimal(v) => v.to_sql_checked(ty, out),
            Value::Text(v) => v.as_str().to_sql_checked(ty, out),
            Value::Bytes(v) => v.as_slice().to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Time(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::TimestampTz(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        KINDS.iter().any(|kind| kind_accepts(*kind, ty))
    }

    tokio_postgres::types::to_sql_checked!();
}

fn decode_err(column: &str, err: tokio_postgres::Error) -> SqlError {
    SqlError::decode(column, err.to_string())
}

fn column_value(row: &tokio_postgres::Row, idx: usize) -> SqlResult<Value> {
    let column = &row.columns()[idx];
    let name = column.name();
    macro_rules! get {
        ($ty:ty, $variant:path) => {
            row.try_get::<_, Option<$ty>>(idx)
                .map_err(|e| decode_err(name, e))?
                .map_or(Value::Null, $variant)
        };
    }

    let value = match *column.type_() {
        Type::BOOL => get!(bool, Value::Bool),
        Type::INT2 => get!(i16, Value::I16),
        Type::INT4 => get!(i32, Value::I32),
        Type::INT8 => get!(i64, Value::I64),
        Type::FLOAT4 => get!(f32, Value::F32),
        Type::FLOAT8 => get!(f64, Value::F64),
        Type::NUMERIC => get!(Decimal, Value::Decimal),
        Type::BYTEA => get!(Vec<u8>, Value::Bytes),
        Type::DATE => get!(chrono::NaiveDate, Value::Date),
        Type::TIME => get!(chrono::NaiveTime, Value::Time),
        Type::TIMESTAMP => get!(chrono::NaiveDateTime, Value::Timestamp),
        Type::TIMESTAMPTZ => get!(chrono::DateTime<chrono::Utc>, Value::TimestampTz),
        Type::UUID => get!(uuid::Uuid, Value::Uuid),
        Type::JSON | Type::JSONB => get!(serde_json::Value, Value::Json),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get!(String, Value::Text)
        }
        ref other => {
            return Err(SqlError::decode(
                name,
                format!("unsupported column type {}; cast it in SQL", other.name()),
            ));
        }
    };
    Ok(value)
}

/// Convert driver rows, sharing one column label list across the result set.
pub(crate) fn convert_rows(rows: Vec<tokio_postgres::Row>) -> SqlResult<Vec<Row>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns: Arc<[String]> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    rows.iter()
        .map(|row| {
            let values = (0..row.len())
                .map(|idx| column_value(row, idx))
                .collect::<SqlResult<Vec<_>>>()?;
            Ok(Row::new(columns.clone(), values))
        })
        .collect()
}
