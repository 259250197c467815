//! Fluent SQL statement builders.
//!
//! - [`NamedSelect`] / [`IndexedSelect`]: SELECT with `:name` or `?` placeholders
//! - [`InsertSql`], [`UpdateSql`], [`DeleteSql`]: DML, generic over the [`BindMode`]
//!
//! Clause methods may be called in any order; rendering always follows SQL
//! clause order. Misuse such as a `?` count mismatch is recorded on the
//! builder and reported as [`SqlError::Build`](crate::SqlError::Build) when
//! the statement is rendered.

pub mod clause;
pub mod delete;
pub mod indexed;
pub mod insert;
pub mod mode;
pub mod named;
pub mod predicate;
pub mod select;
pub mod update;
pub mod where_clause;

pub use clause::{Direction, Fragment, JoinKind};
pub use delete::DeleteSql;
pub use indexed::IndexedSelect;
pub use insert::InsertSql;
pub use mode::{BindMode, Indexed, Named};
pub use named::NamedSelect;
pub use predicate::Predicate;
pub use select::{SelectClauses, SelectStatement};
pub use update::UpdateSql;
pub use where_clause::WhereClause;

#[cfg(test)]
mod tests;
