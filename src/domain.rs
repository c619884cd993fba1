use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::money::Money;
use crate::period::PeriodKey;

/// Stable identity of an entry inside its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, enough to address an entry from the CLI.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let needle = prefix.trim().to_ascii_lowercase().replace('-', "");
        !needle.is_empty() && self.0.simple().to_string().starts_with(&needle)
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Wallet,
    Bank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LendDirection {
    /// Money handed out; the counterparty owes it back.
    Lend,
    /// Money received; the user owes it back.
    Borrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LendingStatus {
    Pending,
    Settled,
}

macro_rules! keyword_enum {
    ($ty:ident { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "expected one of [{}], got '{other}'",
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

keyword_enum!(PaymentMethod { "wallet" => Wallet, "bank" => Bank });
keyword_enum!(LendDirection { "lend" => Lend, "borrow" => Borrow });
keyword_enum!(LendingStatus { "pending" => Pending, "settled" => Settled });

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub source: String,
    pub amount: Money,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub category: String,
    pub amount: Money,
    pub method: PaymentMethod,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub counterparty: String,
    pub amount: Money,
    #[serde(default)]
    pub reason: String,
    pub direction: LendDirection,
    pub status: LendingStatus,
}

/// Changed fields for an income edit. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomePatch {
    pub date: Option<NaiveDate>,
    pub source: Option<String>,
    pub amount: Option<Money>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub amount: Option<Money>,
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LendingPatch {
    pub date: Option<NaiveDate>,
    pub counterparty: Option<String>,
    pub amount: Option<Money>,
    pub reason: Option<String>,
    pub direction: Option<LendDirection>,
    pub status: Option<LendingStatus>,
}

/// Common surface the reconciler and aggregator need from every entry kind.
pub trait Entry: Clone {
    type Patch;

    const KIND: &'static str;

    fn id(&self) -> EntryId;
    fn amount(&self) -> &Money;
    fn date(&self) -> NaiveDate;

    /// The entry with `patch` applied on top of its current fields.
    fn patched(&self, patch: &Self::Patch) -> Self;
    fn patch_amount(patch: &Self::Patch) -> Option<&Money>;
}

impl Entry for IncomeEntry {
    type Patch = IncomePatch;

    const KIND: &'static str = "income";

    fn id(&self) -> EntryId {
        self.id
    }

    fn amount(&self) -> &Money {
        &self.amount
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn patched(&self, patch: &IncomePatch) -> Self {
        Self {
            id: self.id,
            date: patch.date.unwrap_or(self.date),
            source: patch.source.clone().unwrap_or_else(|| self.source.clone()),
            amount: patch.amount.clone().unwrap_or_else(|| self.amount.clone()),
            notes: patch.notes.clone().unwrap_or_else(|| self.notes.clone()),
        }
    }

    fn patch_amount(patch: &IncomePatch) -> Option<&Money> {
        patch.amount.as_ref()
    }
}

impl Entry for ExpenseEntry {
    type Patch = ExpensePatch;

    const KIND: &'static str = "expense";

    fn id(&self) -> EntryId {
        self.id
    }

    fn amount(&self) -> &Money {
        &self.amount
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn patched(&self, patch: &ExpensePatch) -> Self {
        Self {
            id: self.id,
            date: patch.date.unwrap_or(self.date),
            category: patch
                .category
                .clone()
                .unwrap_or_else(|| self.category.clone()),
            amount: patch.amount.clone().unwrap_or_else(|| self.amount.clone()),
            method: patch.method.unwrap_or(self.method),
            notes: patch.notes.clone().unwrap_or_else(|| self.notes.clone()),
        }
    }

    fn patch_amount(patch: &ExpensePatch) -> Option<&Money> {
        patch.amount.as_ref()
    }
}

impl Entry for LendingEntry {
    type Patch = LendingPatch;

    const KIND: &'static str = "lending";

    fn id(&self) -> EntryId {
        self.id
    }

    fn amount(&self) -> &Money {
        &self.amount
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn patched(&self, patch: &LendingPatch) -> Self {
        Self {
            id: self.id,
            date: patch.date.unwrap_or(self.date),
            counterparty: patch
                .counterparty
                .clone()
                .unwrap_or_else(|| self.counterparty.clone()),
            amount: patch.amount.clone().unwrap_or_else(|| self.amount.clone()),
            reason: patch.reason.clone().unwrap_or_else(|| self.reason.clone()),
            direction: patch.direction.unwrap_or(self.direction),
            status: patch.status.unwrap_or(self.status),
        }
    }

    fn patch_amount(patch: &LendingPatch) -> Option<&Money> {
        patch.amount.as_ref()
    }
}

/// Everything recorded for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodLedger {
    #[serde(skip, default = "placeholder_period")]
    pub period: PeriodKey,
    #[serde(default)]
    pub income: Vec<IncomeEntry>,
    #[serde(default)]
    pub expenses: Vec<ExpenseEntry>,
    #[serde(default)]
    pub lending: Vec<LendingEntry>,
    /// Primary-currency subunits.
    #[serde(default)]
    pub wallet: i64,
    /// Primary-currency subunits.
    #[serde(default)]
    pub savings: i64,
}

// Overwritten by the store right after decoding; the key is not part of the snapshot.
fn placeholder_period() -> PeriodKey {
    PeriodKey::of(NaiveDate::default())
}

impl PeriodLedger {
    pub fn empty(period: PeriodKey) -> Self {
        Self {
            period,
            income: Vec::new(),
            expenses: Vec::new(),
            lending: Vec::new(),
            wallet: 0,
            savings: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty()
            && self.expenses.is_empty()
            && self.lending.is_empty()
            && self.wallet == 0
            && self.savings == 0
    }
}

/// Finds the position of the single entry whose id is `id` or starts with it.
pub fn locate<E: Entry>(entries: &[E], id: &str) -> Result<usize, LedgerError> {
    let mut hits = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.id().matches_prefix(id));
    match (hits.next(), hits.next()) {
        (Some((idx, _)), None) => Ok(idx),
        (None, _) => Err(LedgerError::EntryNotFound {
            kind: E::KIND,
            id: id.to_string(),
        }),
        (Some(_), Some(_)) => Err(LedgerError::AmbiguousEntry {
            kind: E::KIND,
            id: id.to_string(),
        }),
    }
}
