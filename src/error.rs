use thiserror::Error;

use crate::money::Currency;

/// Conditions the ledger core signals back to the caller.
///
/// Every variant is raised before any state is touched, so a rejected
/// operation leaves the ledger exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    #[error("insufficient funds: requested {requested}, wallet holds {available}")]
    InsufficientFunds { requested: String, available: String },

    #[error("no {kind} entry matches '{id}'")]
    EntryNotFound { kind: &'static str, id: String },

    #[error("'{id}' matches more than one {kind} entry; use a longer id")]
    AmbiguousEntry { kind: &'static str, id: String },

    #[error("invalid currency code: '{0}'")]
    InvalidCurrency(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("unreadable snapshot for {key}: {source}")]
    Snapshot {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a persisted user action: either the ledger rejected it or the
/// snapshot could not be written.
#[derive(Debug, Error)]
pub enum BookError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
