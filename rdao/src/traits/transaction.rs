//! Transaction types for rdao

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Transaction isolation level.
///
/// Defines the degree to which one transaction must be isolated from
/// resource or data modifications made by other transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    /// Allows dirty reads, non-repeatable reads, and phantom reads.
    ReadUncommitted,

    /// Prevents dirty reads but allows non-repeatable reads and phantom reads.
    ReadCommitted,

    /// Prevents dirty reads and non-repeatable reads but allows phantom reads.
    RepeatableRead,

    /// Provides full isolation. Transactions are completely isolated from one another.
    /// This is the default for rdao transactions.
    #[default]
    Serializable,
}

impl IsolationLevel {
    /// The SQL spelling of this level, as used in `SET TRANSACTION ISOLATION LEVEL`.
    pub fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// How a transaction that produces a single value ended.
///
/// A transaction is either committed with its value or rolled back with the
/// error that caused the rollback, never both.
#[derive(Debug)]
pub enum TransactionOutcome<T> {
    Committed(T),
    /// Nothing was committed. A rollback is only sent when the transaction
    /// was open: failures to acquire a connection, to begin, or to commit
    /// (`Error::Commit`) end here without one.
    RolledBack(Error),
}

impl<T> TransactionOutcome<T> {
    /// Whether the transaction was committed.
    pub fn is_committed(&self) -> bool {
        matches!(self, TransactionOutcome::Committed(_))
    }

    /// Convert into a `Result`, the committed value being `Ok`.
    pub fn into_result(self) -> Result<T> {
        match self {
            TransactionOutcome::Committed(value) => Ok(value),
            TransactionOutcome::RolledBack(err) => Err(err),
        }
    }
}

impl<T> From<Result<T>> for TransactionOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => TransactionOutcome::Committed(value),
            Err(err) => TransactionOutcome::RolledBack(err),
        }
    }
}
