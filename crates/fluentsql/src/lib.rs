//! # fluentsql
//!
//! A fluent SQL statement builder with a blocking query facade.
//!
//! ## Features
//!
//! - **Two binding disciplines**: named (`:id`) and indexed (`?`) placeholders, never mixed
//! - **Order-free clauses**: call clause methods in any order, SQL renders in clause order
//! - **Validated before I/O**: unbound names and `?` count mismatches fail before the database is hit
//! - **Paging**: count and bounded statements derived from any SELECT or raw SQL
//! - **Row mapping**: entities, single columns, ordered maps or closures
//! - **Hooks**: `tracing`-based SQL logging and slow-query warnings
//!
//! ## Example
//!
//! ```ignore
//! use fluentsql::prelude::*;
//!
//! fluentsql::entity! {
//!     #[derive(Debug)]
//!     pub struct User in "users" {
//!         pub id: i64,
//!         pub name: String,
//!     }
//! }
//!
//! let repo = Repository::new(PgAccess::from_env()?);
//!
//! let q = NamedSelect::of(|s| {
//!     s.select_from::<User>().and_where("age > :minAge").order_by_asc(&["name"]);
//!     s.bind("minAge", 18);
//! });
//! let adults: Vec<User> = repo.query_list(&q)?;
//! let page = repo.query_page::<User>(&q, PageRequest::new(1, 20)?)?;
//!
//! let mut q = IndexedSelect::new();
//! q.select(&["name"]).from(&["users"]).and_where_bind("id = ?", [7]);
//! let name: Option<String> = repo.query_object_single(&q)?;
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod monitor;
pub mod paging;
pub mod params;
pub mod prelude;
pub mod repository;
pub mod row;
pub mod statement;
pub mod value;

#[cfg(feature = "postgres")]
pub mod pg_client;

pub use builder::{
    BindMode, DeleteSql, Direction, Indexed, IndexedSelect, InsertSql, JoinKind, Named,
    NamedSelect, Predicate, SelectClauses, UpdateSql,
};
pub use client::DataAccess;
pub use config::{RepositoryConfig, SingleRowPolicy};
pub use entity::{Entity, FieldColumn};
pub use error::{SqlError, SqlResult};
pub use mapper::{BeanMapper, MapMapper, RowMapper, SingleColumnMapper};
pub use monitor::{HookAction, QueryContext, QueryHook, QueryResult, QueryType, TracingSqlHook};
pub use paging::{Page, PageRequest};
pub use params::{BoundValue, ParameterSet};
pub use repository::Repository;
pub use row::{FromRow, Row, RowMap};
pub use rust_decimal::Decimal;
pub use statement::{RawSql, Rendered, Statement};
pub use value::{FromValue, Value, ValueKind};

#[cfg(feature = "postgres")]
pub use pg_client::{PgAccess, PgAccessConfig};
