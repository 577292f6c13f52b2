//! rdao - reactive data access over pooled connections
//!
//! A connection-scoped statement executor built on `mysql_async`, with
//! transactions, batch binding and derive macros for mapping between Rust
//! structs and database rows.
//!
//! # Features
//!
//! - **Scoped connections**: every operation checks out one connection and
//!   returns it when its result stream ends, fails, or is dropped
//! - **Transactions**: commit on success, rollback on error or cancellation
//! - **Batch binding**: N items bound into one statement, results correlated
//!   back to the items in order
//! - **Derive Macros**: `#[derive(FromRow, ToParams)]` for automatic mapping
//!
//! # Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//! use rdao::{params, Dao, FromRow, IsolationLevel, MySqlPool, RowExt, Statement};
//!
//! #[derive(FromRow)]
//! pub struct SomeEntity {
//!     pub id: i64,
//!     pub svalue: Option<String>,
//! }
//!
//! async fn demo(dao: &Dao<MySqlPool>) -> rdao::Result<()> {
//!     let ids: Vec<i64> = dao
//!         .batch_insert(
//!             |conn| conn.create_statement("INSERT INTO some_entity (svalue) VALUES (?)")
//!                 .return_generated_values(["id"]),
//!             vec!["a", "b"],
//!             |params, v| { params.bind(0, *v); Ok(()) },
//!             |row, _| row.get("id"),
//!         )
//!         .try_collect()
//!         .await?;
//!
//!     let all: Vec<SomeEntity> = dao
//!         .select_as("SELECT id, svalue FROM some_entity", params![])
//!         .try_collect()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod dao;
pub mod error;
pub mod executor;
pub mod mysql;
pub mod params;
pub mod query;
pub mod scope;
pub mod statement;
pub mod stream;
pub mod traits;
pub mod transaction;
pub mod value;

// Re-export the derive macros
pub use rdao_derive::{FromRow, ToParams};

// Re-export main types
pub use batch::{BatchInsert, BatchJob};
pub use crate::config::PoolSettings;
pub use dao::Dao;
pub use error::{Error, Result};
pub use mysql::{MySqlConnection, MySqlPool, MySqlPoolBuilder, MySqlRow};
pub use params::{Bound, ParameterSet};
pub use query::Query;
pub use scope::ScopedConnection;
pub use statement::Statement;
pub use traits::{
    Connection, ConnectionPool, FromRow, FromValue, IsolationLevel, Row, RowExt, RowStream,
    Segment, ToParams, ToValue, TransactionOutcome,
};
pub use value::{Value, ValueType};
