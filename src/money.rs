//! Fixed-point money.
//!
//! Amounts are stored as whole subunits (thousandths) in an `i64`; floating
//! point never touches a balance. Decimal text is read through
//! `rust_decimal` and then pinned to three fractional digits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

/// Fractional digits kept for every currency.
pub const SUBUNIT_DIGITS: u32 = 3;
/// Subunits per whole currency unit.
pub const SUBUNITS_PER_UNIT: u64 = 1_000;

const MAX_CURRENCY_LEN: usize = 8;

/// A currency tag such as `KWD` or `USD`.
///
/// Codes are opaque: nothing converts between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(raw: &str) -> LedgerResult<Self> {
        let code = raw.trim().to_ascii_uppercase();
        let valid = !code.is_empty()
            && code.len() <= MAX_CURRENCY_LEN
            && code.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(LedgerError::InvalidCurrency(raw.to_string()));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Signed amount in subunits.
    pub amount: i64,
    pub currency: Currency,
}

impl Money {
    pub fn from_subunits(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::from_subunits(0, currency)
    }

    /// Reads decimal text such as `"25.5"` or `"-0.125"`.
    ///
    /// Fraction digits past the third are dropped, not rounded.
    pub fn parse_decimal(text: &str, currency: Currency) -> LedgerResult<Self> {
        let invalid = || LedgerError::InvalidAmount(text.to_string());

        let trimmed = text.trim();
        let (sign, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => ("-", &trimmed[1..]),
            Some(b'+') => ("", &trimmed[1..]),
            _ => ("", trimmed),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !digits_only(int_part)
            || !digits_only(frac_part)
        {
            return Err(invalid());
        }

        let kept = &frac_part[..frac_part.len().min(SUBUNIT_DIGITS as usize)];
        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let normalized = if kept.is_empty() {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{kept}")
        };

        let mut value = Decimal::from_str(&normalized).map_err(|_| invalid())?;
        value.rescale(SUBUNIT_DIGITS);
        if value.scale() != SUBUNIT_DIGITS {
            return Err(invalid());
        }
        let amount = i64::try_from(value.mantissa()).map_err(|_| invalid())?;
        Ok(Self::from_subunits(amount, currency))
    }

    /// `<sign><int>.<fraction>` with exactly three fraction digits.
    pub fn to_decimal_string(&self) -> String {
        format_subunits(self.amount)
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn checked_add(&self, other: &Money) -> LedgerResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| LedgerError::InvalidAmount("sum out of range".to_string()))?;
        Ok(Self::from_subunits(amount, self.currency.clone()))
    }

    pub fn checked_sub(&self, other: &Money) -> LedgerResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| LedgerError::InvalidAmount("difference out of range".to_string()))?;
        Ok(Self::from_subunits(amount, self.currency.clone()))
    }

    fn ensure_same_currency(&self, other: &Money) -> LedgerResult<()> {
        if self.currency != other.currency {
            return Err(LedgerError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.to_decimal_string())
    }
}

/// Renders raw subunits as decimal text, shared by balance displays.
pub fn format_subunits(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!(
        "{sign}{}.{:03}",
        abs / SUBUNITS_PER_UNIT,
        abs % SUBUNITS_PER_UNIT
    )
}
