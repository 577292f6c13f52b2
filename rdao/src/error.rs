//! Error types for rdao

use thiserror::Error;

/// Result type alias for rdao operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during database operations.
///
/// Every failure is reported on the stream (or future) returned by the
/// operation that caused it; nothing is logged and swallowed.
#[derive(Error, Debug)]
pub enum Error {
    /// The pool could not hand out a connection (exhausted, or establishing a
    /// new session failed). No connection was obtained.
    #[error("Failed to acquire connection: {0}")]
    Acquisition(String),

    /// A value could not be bound to a statement parameter.
    #[error("Failed to bind parameter {param}: {reason}")]
    Binding { param: String, reason: String },

    /// The database rejected or failed the statement.
    #[error("Statement execution failed: {0}")]
    Execution(String),

    /// MySQL driver error
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// A lookup that expected exactly one row found none.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Committing the transaction failed; nothing was committed.
    #[error("Commit failed: {0}")]
    Commit(#[source] Box<Error>),

    /// The transaction failed and the rollback that followed failed too.
    ///
    /// `cause` is the original failure and stays the primary error.
    #[error("{cause} (rollback also failed: {rollback})")]
    Rollback {
        #[source]
        cause: Box<Error>,
        rollback: Box<Error>,
    },

    /// A stream expected to produce exactly one value produced none.
    #[error("Expected exactly one result, got none")]
    EmptyResult,

    /// A stream expected to produce exactly one value produced more.
    #[error("Expected exactly one result, got more than one")]
    MultipleResults,

    /// The driver returned a different number of batch results than inputs.
    #[error("Batch produced {results} result rows for {inputs} inputs")]
    BatchCorrelation { inputs: usize, results: usize },

    /// Type conversion error
    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion {
        expected: &'static str,
        actual: String,
    },

    /// Column not found in row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Null value for non-optional field
    #[error("Unexpected null value for column: {0}")]
    UnexpectedNull(String),

    /// Row decode error
    #[error("Failed to decode row: {0}")]
    RowDecode(String),

    /// Connection state error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a binding error for the given parameter.
    pub fn binding(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Binding {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error reports a lookup that found nothing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Rollback { cause, .. } => cause.is_not_found(),
            _ => false,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
