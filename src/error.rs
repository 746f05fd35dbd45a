use thiserror::Error;

/// Represents all possible errors that can occur when interacting with the record store
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database errors that occur with the underlying storage backend
    #[error("Database error: {0}")]
    Database(String),

    /// Errors related to missing or invalid data
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic errors that don't fit in other categories
    #[error("Other error: {0}")]
    Other(String),

    /// Anyhow error wrapper for error context
    #[error(transparent)]
    Context(#[from] anyhow::Error),
}

#[cfg(feature = "rocksdb")]
impl From<rocksdb::Error> for StorageError {
    fn from(err: rocksdb::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound("Row not found".to_string()),
            _ => StorageError::Database(err.to_string()),
        }
    }
}

/// Errors reported by a coin ledger when a credit or debit is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The account does not hold enough of the denomination
    #[error("insufficient funds for {address}: {available}{denom} available, {requested}{denom} requested")]
    InsufficientFunds {
        address: String,
        denom: String,
        available: String,
        requested: String,
    },

    /// The coin set handed to the ledger is malformed
    #[error("invalid coins: {0}")]
    InvalidCoins(String),

    /// The ledger refused the operation for a host-specific reason
    #[error("ledger rejected the operation: {0}")]
    Rejected(String),
}

/// Errors produced by the branded token registry, handler and querier
#[derive(Error, Debug)]
pub enum TokenError {
    /// A command or query carried malformed or missing fields
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced branded token does not exist
    #[error("branded token `{0}` does not exist")]
    NotFound(String),

    /// The sender is not the recorded owner of the branded token
    #[error("{sender} is not the owner of branded token `{slug}`")]
    NotOwner { slug: String, sender: String },

    /// A branded token with the same slug is already registered
    #[error("branded token `{0}` already exists")]
    AlreadyExists(String),

    /// The coin ledger refused a credit or debit
    #[error("coin ledger failure: {0}")]
    Ledger(#[from] LedgerError),

    /// A stored record could not be decoded
    #[error("failed to decode branded token `{slug}`: {reason}")]
    Codec { slug: String, reason: String },

    /// The record store itself failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The query path or message kind is not handled by this module
    #[error("unknown request: {0}")]
    UnknownRequest(String),

    /// A JSON encode/decode step failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TokenError {
    /// Client errors are reported back to the sender and leave the registry untouched
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TokenError::Validation(_)
                | TokenError::NotFound(_)
                | TokenError::NotOwner { .. }
                | TokenError::AlreadyExists(_)
                | TokenError::UnknownRequest(_)
        )
    }
}
