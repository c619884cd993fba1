use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month, the unit of ledger isolation. Renders as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> LedgerResult<Self> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(LedgerError::InvalidPeriod(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Human form, e.g. `February 2026`.
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated year/month always has a first day")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidPeriod(format!("expected YYYY-MM, got '{s}'"));
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if y.len() != 4 || m.len() != 2 || !digits(y) || !digits(m) {
            return Err(invalid());
        }
        let year = y.parse::<i32>().map_err(|_| invalid())?;
        let month = m.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeriodKey> for String {
    fn from(value: PeriodKey) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_zero_padded_year_month() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 25).unwrap();
        assert_eq!(PeriodKey::of(date).to_string(), "2026-02");
    }

    #[test]
    fn label_names_the_month() {
        let key: PeriodKey = "2026-02".parse().unwrap();
        assert_eq!(key.label(), "February 2026");
        let key: PeriodKey = "1999-12".parse().unwrap();
        assert_eq!(key.label(), "December 1999");
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        for raw in ["2026", "2026-2", "2026-13", "2026-00", "26-02", "abcd-ef", "2026-02-01"] {
            assert!(raw.parse::<PeriodKey>().is_err(), "accepted {raw}");
        }
    }

    #[test]
    fn signed_parts_are_rejected() {
        for raw in ["+999-01", "-999-01", "2026-+1", " 202-01"] {
            assert!(raw.parse::<PeriodKey>().is_err(), "accepted {raw}");
        }
        let key: PeriodKey = "0999-01".parse().unwrap();
        assert_eq!(key.to_string(), "0999-01");
    }

    #[test]
    fn contains_and_first_day() {
        let key: PeriodKey = "2024-02".parse().unwrap();
        assert_eq!(key.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert!(key.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!key.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }
}
