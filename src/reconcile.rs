//! Balance reconciliation.
//!
//! The [`Reconciler`] is the only code that writes `wallet` and `savings`.
//! Every entry kind maps to an [`Effect`]; creating an entry applies it,
//! deleting reverts it, and editing reverts the stored entry before applying
//! the patched one. Balances are always computed on a scratch copy first, so
//! a rejected operation never leaves a half-applied ledger behind.

use std::iter;

use crate::aggregate::totals_by_currency;
use crate::domain::{
    Entry, EntryId, ExpenseEntry, IncomeEntry, LendingEntry, PaymentMethod, PeriodLedger, locate,
};
use crate::error::{LedgerError, LedgerResult};
use crate::money::{Currency, Money};

/// Signed change an entry contributes to the two primary balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effect {
    pub wallet: i64,
    pub savings: i64,
}

pub trait BalanceEffect {
    fn effect(&self, primary: &Currency) -> Effect;
}

impl BalanceEffect for IncomeEntry {
    fn effect(&self, primary: &Currency) -> Effect {
        if self.amount.currency != *primary {
            return Effect::default();
        }
        Effect {
            wallet: self.amount.amount,
            savings: 0,
        }
    }
}

impl BalanceEffect for ExpenseEntry {
    fn effect(&self, primary: &Currency) -> Effect {
        if self.amount.currency != *primary {
            return Effect::default();
        }
        match self.method {
            PaymentMethod::Wallet => Effect {
                wallet: -self.amount.amount,
                savings: 0,
            },
            PaymentMethod::Bank => Effect {
                wallet: 0,
                savings: -self.amount.amount,
            },
        }
    }
}

impl BalanceEffect for LendingEntry {
    fn effect(&self, _primary: &Currency) -> Effect {
        // Lending is exposure only.
        Effect::default()
    }
}

/// An entry kind with its own log inside a [`PeriodLedger`].
pub trait Logged: Entry + BalanceEffect {
    fn log(ledger: &PeriodLedger) -> &Vec<Self>;
    fn log_mut(ledger: &mut PeriodLedger) -> &mut Vec<Self>;
}

impl Logged for IncomeEntry {
    fn log(ledger: &PeriodLedger) -> &Vec<Self> {
        &ledger.income
    }

    fn log_mut(ledger: &mut PeriodLedger) -> &mut Vec<Self> {
        &mut ledger.income
    }
}

impl Logged for ExpenseEntry {
    fn log(ledger: &PeriodLedger) -> &Vec<Self> {
        &ledger.expenses
    }

    fn log_mut(ledger: &mut PeriodLedger) -> &mut Vec<Self> {
        &mut ledger.expenses
    }
}

impl Logged for LendingEntry {
    fn log(ledger: &PeriodLedger) -> &Vec<Self> {
        &ledger.lending
    }

    fn log_mut(ledger: &mut PeriodLedger) -> &mut Vec<Self> {
        &mut ledger.lending
    }
}

/// Scratch copy of the two balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balances {
    pub wallet: i64,
    pub savings: i64,
}

impl Balances {
    pub fn of(ledger: &PeriodLedger) -> Self {
        Self {
            wallet: ledger.wallet,
            savings: ledger.savings,
        }
    }

    pub fn apply(&mut self, effect: Effect) -> LedgerResult<()> {
        self.shift(effect.wallet, effect.savings)
    }

    pub fn revert(&mut self, effect: Effect) -> LedgerResult<()> {
        let wallet = effect.wallet.checked_neg().ok_or_else(overflow)?;
        let savings = effect.savings.checked_neg().ok_or_else(overflow)?;
        self.shift(wallet, savings)
    }

    fn shift(&mut self, wallet: i64, savings: i64) -> LedgerResult<()> {
        let wallet = self.wallet.checked_add(wallet).ok_or_else(overflow)?;
        let savings = self.savings.checked_add(savings).ok_or_else(overflow)?;
        self.wallet = wallet;
        self.savings = savings;
        Ok(())
    }

    fn commit(self, ledger: &mut PeriodLedger) {
        ledger.wallet = self.wallet;
        ledger.savings = self.savings;
    }
}

fn overflow() -> LedgerError {
    LedgerError::InvalidAmount("balance out of range".to_string())
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    primary: Currency,
}

impl Reconciler {
    pub fn new(primary: Currency) -> Self {
        Self { primary }
    }

    pub fn primary(&self) -> &Currency {
        &self.primary
    }

    pub fn apply_effect<E: BalanceEffect>(
        &self,
        ledger: &mut PeriodLedger,
        entry: &E,
    ) -> LedgerResult<()> {
        let mut balances = Balances::of(ledger);
        balances.apply(entry.effect(&self.primary))?;
        balances.commit(ledger);
        Ok(())
    }

    /// Exact inverse of [`Reconciler::apply_effect`]; must see the entry as stored.
    pub fn revert_effect<E: BalanceEffect>(
        &self,
        ledger: &mut PeriodLedger,
        entry: &E,
    ) -> LedgerResult<()> {
        let mut balances = Balances::of(ledger);
        balances.revert(entry.effect(&self.primary))?;
        balances.commit(ledger);
        Ok(())
    }

    /// Appends `entry` and applies its effect.
    pub fn create<E: Logged>(&self, ledger: &mut PeriodLedger, entry: E) -> LedgerResult<EntryId> {
        require_positive(entry.amount())?;
        // Every later summary sums the log per currency; keep those sums in range.
        totals_by_currency(E::log(ledger).iter().chain(iter::once(&entry)))?;

        let mut balances = Balances::of(ledger);
        balances.apply(entry.effect(&self.primary))?;

        let id = entry.id();
        E::log_mut(ledger).push(entry);
        balances.commit(ledger);
        Ok(id)
    }

    /// Reverts the stored entry, overwrites it with `patch`, and applies the result.
    /// The entry keeps its position in the log.
    pub fn edit<E: Logged>(
        &self,
        ledger: &mut PeriodLedger,
        id: &str,
        patch: &E::Patch,
    ) -> LedgerResult<E> {
        let idx = locate(E::log(ledger), id)?;
        if let Some(amount) = E::patch_amount(patch) {
            require_positive(amount)?;
        }

        let stored = &E::log(ledger)[idx];
        let updated = stored.patched(patch);
        totals_by_currency(
            E::log(ledger)
                .iter()
                .enumerate()
                .map(|(i, e)| if i == idx { &updated } else { e }),
        )?;

        let mut balances = Balances::of(ledger);
        balances.revert(stored.effect(&self.primary))?;
        balances.apply(updated.effect(&self.primary))?;

        E::log_mut(ledger)[idx] = updated.clone();
        balances.commit(ledger);
        Ok(updated)
    }

    /// Reverts the entry's effect and removes it from the log.
    pub fn delete<E: Logged>(&self, ledger: &mut PeriodLedger, id: &str) -> LedgerResult<E> {
        let idx = locate(E::log(ledger), id)?;

        let mut balances = Balances::of(ledger);
        balances.revert(E::log(ledger)[idx].effect(&self.primary))?;

        let removed = E::log_mut(ledger).remove(idx);
        balances.commit(ledger);
        Ok(removed)
    }

    /// Moves primary money from the wallet into savings.
    pub fn transfer_wallet_to_savings(
        &self,
        ledger: &mut PeriodLedger,
        amount: &Money,
    ) -> LedgerResult<()> {
        self.require_primary(amount)?;
        if amount.amount <= 0 || amount.amount > ledger.wallet {
            return Err(LedgerError::InsufficientFunds {
                requested: amount.to_string(),
                available: Money::from_subunits(ledger.wallet, self.primary.clone()).to_string(),
            });
        }

        let mut balances = Balances::of(ledger);
        balances.apply(Effect {
            wallet: -amount.amount,
            savings: amount.amount,
        })?;
        balances.commit(ledger);
        Ok(())
    }

    /// Adds to savings without touching the wallet: money saved from outside
    /// the tracked wallet.
    pub fn credit_savings_directly(
        &self,
        ledger: &mut PeriodLedger,
        amount: &Money,
    ) -> LedgerResult<()> {
        self.require_primary(amount)?;
        require_positive(amount)?;

        let mut balances = Balances::of(ledger);
        balances.apply(Effect {
            wallet: 0,
            savings: amount.amount,
        })?;
        balances.commit(ledger);
        Ok(())
    }

    fn require_primary(&self, amount: &Money) -> LedgerResult<()> {
        if amount.currency != self.primary {
            return Err(LedgerError::CurrencyMismatch {
                left: self.primary.clone(),
                right: amount.currency.clone(),
            });
        }
        Ok(())
    }
}

fn require_positive(amount: &Money) -> LedgerResult<()> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount(format!(
            "{amount} must be greater than zero"
        )));
    }
    Ok(())
}
