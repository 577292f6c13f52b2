//! MySQL backend for rdao

mod connection;
mod pool;
mod row;
mod types;

pub use connection::MySqlConnection;
pub use pool::{MySqlPool, MySqlPoolBuilder};
pub use row::MySqlRow;
