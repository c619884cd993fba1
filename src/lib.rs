//! Monthly household ledger.
//!
//! Income, expenses and peer lending are recorded per calendar month. A
//! wallet and a savings balance in one primary currency are kept consistent
//! with the live entries through create, edit and delete; every other
//! currency is tracked as tagged totals and never converted.

pub mod aggregate;
pub mod book;
pub mod domain;
pub mod error;
pub mod money;
pub mod period;
pub mod reconcile;
pub mod statement;
pub mod store;

pub use aggregate::{LendingExposure, Summary};
pub use book::Book;
pub use domain::{
    EntryId, ExpenseEntry, ExpensePatch, IncomeEntry, IncomePatch, LendDirection, LendingEntry,
    LendingPatch, LendingStatus, PaymentMethod, PeriodLedger,
};
pub use error::{BookError, LedgerError, StoreError};
pub use money::{Currency, Money};
pub use period::PeriodKey;
pub use reconcile::Reconciler;
pub use store::{KvStore, LedgerStore, MemoryKv, SqliteKv};
