//! Read-only summaries over a period.
//!
//! Amounts are grouped by currency tag and never combined across tags. Maps
//! are `BTreeMap`s so iteration (and therefore rendering) is sorted by code.

use std::collections::BTreeMap;

use crate::domain::{Entry, LendDirection, LendingEntry, LendingStatus, PeriodLedger};
use crate::error::LedgerResult;
use crate::money::{Currency, Money};

pub type CurrencyTotals = BTreeMap<Currency, Money>;

pub fn totals_by_currency<'a, E, I>(entries: I) -> LedgerResult<CurrencyTotals>
where
    E: Entry + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut totals = CurrencyTotals::new();
    for entry in entries {
        accumulate(&mut totals, entry.amount())?;
    }
    Ok(totals)
}

fn accumulate(totals: &mut CurrencyTotals, amount: &Money) -> LedgerResult<()> {
    match totals.get_mut(&amount.currency) {
        Some(sum) => *sum = sum.checked_add(amount)?,
        None => {
            totals.insert(amount.currency.clone(), amount.clone());
        }
    }
    Ok(())
}

/// Income minus expenses per currency over the union of both key sets.
pub fn derived_savings_by_currency(
    income: &CurrencyTotals,
    expenses: &CurrencyTotals,
) -> LedgerResult<CurrencyTotals> {
    let mut out = CurrencyTotals::new();
    for currency in income.keys().chain(expenses.keys()) {
        if out.contains_key(currency) {
            continue;
        }
        let zero = Money::zero(currency.clone());
        let earned = income.get(currency).unwrap_or(&zero);
        let spent = expenses.get(currency).unwrap_or(&zero);
        out.insert(currency.clone(), earned.checked_sub(spent)?);
    }
    Ok(out)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LendingExposure {
    /// Pending amounts others owe the user.
    pub to_receive: CurrencyTotals,
    /// Pending amounts the user owes others.
    pub to_pay_back: CurrencyTotals,
}

pub fn lending_exposure<'a, I>(entries: I) -> LedgerResult<LendingExposure>
where
    I: IntoIterator<Item = &'a LendingEntry>,
{
    let mut exposure = LendingExposure::default();
    for entry in entries {
        if entry.status != LendingStatus::Pending {
            continue;
        }
        let bucket = match entry.direction {
            LendDirection::Lend => &mut exposure.to_receive,
            LendDirection::Borrow => &mut exposure.to_pay_back,
        };
        accumulate(bucket, &entry.amount)?;
    }
    Ok(exposure)
}

/// Dashboard figures for one period, the flattened view statements render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub wallet: Money,
    pub savings: Money,
    pub income: CurrencyTotals,
    pub expenses: CurrencyTotals,
    pub derived_savings: CurrencyTotals,
    pub exposure: LendingExposure,
}

impl Summary {
    pub fn of(ledger: &PeriodLedger, primary: &Currency) -> LedgerResult<Self> {
        let income = totals_by_currency(&ledger.income)?;
        let expenses = totals_by_currency(&ledger.expenses)?;
        let derived_savings = derived_savings_by_currency(&income, &expenses)?;
        Ok(Self {
            wallet: Money::from_subunits(ledger.wallet, primary.clone()),
            savings: Money::from_subunits(ledger.savings, primary.clone()),
            income,
            expenses,
            derived_savings,
            exposure: lending_exposure(&ledger.lending)?,
        })
    }
}
