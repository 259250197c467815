//! Common imports: `use fluentsql::prelude::*;`

pub use crate::builder::{
    DeleteSql, Indexed, IndexedSelect, InsertSql, Named, NamedSelect, SelectClauses, UpdateSql,
};
pub use crate::client::DataAccess;
pub use crate::entity::Entity;
pub use crate::error::{SqlError, SqlResult};
pub use crate::mapper::RowMapper;
pub use crate::paging::{Page, PageRequest};
pub use crate::params::ParameterSet;
pub use crate::repository::Repository;
pub use crate::row::{FromRow, Row, RowMap};
pub use crate::statement::{RawSql, Statement};

#[cfg(feature = "postgres")]
pub use crate::pg_client::PgAccess;
