//! Static bean ↔ table mapping metadata.
//!
//! Types declare their table and field/column pairs once through the
//! [`entity!`](crate::entity!) macro. Builders read [`Entity::TABLE`] and
//! [`Entity::FIELDS`] for `select_entity`/`from_entity`, and the generated
//! [`FromRow`] impl reads each field from its column.
//!
//! ```ignore
//! fluentsql::entity! {
//!     #[derive(Debug, Clone)]
//!     pub struct User in "users" {
//!         pub id: i64,
//!         pub name: String => "user_name",
//!         pub email: Option<String>,
//!     }
//! }
//! ```

use crate::row::FromRow;

/// One mapped field and the column it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldColumn {
    pub field: &'static str,
    pub column: &'static str,
}

/// Mapping metadata for a row type.
pub trait Entity: FromRow {
    /// Table name.
    const TABLE: &'static str;
    /// Mapped fields, in declaration order.
    const FIELDS: &'static [FieldColumn];

    /// Column names in declaration order.
    fn columns() -> Vec<&'static str> {
        Self::FIELDS.iter().map(|f| f.column).collect()
    }

    /// Column mapped to `field`, if any.
    fn column_of(field: &str) -> Option<&'static str> {
        Self::FIELDS
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.column)
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __entity_column {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $column:literal) => {
        $column
    };
}

/// Declare a struct together with its [`Entity`] metadata and [`FromRow`] impl.
///
/// A field's column defaults to the field name; `=> "column"` overrides it.
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident in $table:literal {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(=> $column:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::entity::Entity for $name {
            const TABLE: &'static str = $table;
            const FIELDS: &'static [$crate::entity::FieldColumn] = &[
                $(
                    $crate::entity::FieldColumn {
                        field: stringify!($field),
                        column: $crate::__entity_column!($field $(, $column)?),
                    },
                )*
            ];
        }

        impl $crate::row::FromRow for $name {
            fn from_row(row: &$crate::row::Row) -> $crate::error::SqlResult<Self> {
                Ok(Self {
                    $(
                        $field: row.try_get::<$ty>($crate::__entity_column!($field $(, $column)?))?,
                    )*
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;
    use crate::value::Value;

    crate::entity! {
        #[derive(Debug, PartialEq)]
        struct Account in "accounts" {
            id: i64,
            owner: String => "owner_name",
            closed_at: Option<chrono::NaiveDateTime>,
        }
    }

    #[test]
    fn metadata_is_static() {
        assert_eq!(Account::TABLE, "accounts");
        assert_eq!(Account::columns(), vec!["id", "owner_name", "closed_at"]);
        assert_eq!(Account::column_of("owner"), Some("owner_name"));
        assert_eq!(Account::column_of("missing"), None);
    }

    #[test]
    fn from_row_reads_mapped_columns() {
        let row = Row::from_pairs([
            ("id", Value::I64(3)),
            ("owner_name", Value::from("bob")),
            ("closed_at", Value::Null),
        ]);
        let account = Account::from_row(&row).unwrap();
        assert_eq!(
            account,
            Account {
                id: 3,
                owner: "bob".into(),
                closed_at: None
            }
        );
    }

    #[test]
    fn field_type_mismatch_is_decode_error() {
        let row = Row::from_pairs([
            ("id", Value::from("x")),
            ("owner_name", Value::from("bob")),
            ("closed_at", Value::Null),
        ]);
        assert!(Account::from_row(&row).unwrap_err().is_decode());
    }
}
