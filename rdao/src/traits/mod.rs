//! Core traits for rdao

mod from_row;
mod from_value;
mod pool;
mod to_params;
mod to_value;
mod transaction;

pub use from_row::{FromRow, Row, RowExt};
pub use from_value::FromValue;
pub use pool::{Connection, ConnectionPool, RowStream, Segment};
pub use to_params::ToParams;
pub use to_value::ToValue;
pub use transaction::{IsolationLevel, TransactionOutcome};
