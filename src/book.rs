//! One open period: the unit a user action works against.
//!
//! Every mutation runs on a scratch copy of the ledger, is persisted, and only
//! then replaces the in-memory ledger. A rejected operation or a failed write
//! leaves both the stored and in-memory state untouched.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::aggregate::Summary;
use crate::domain::{EntryId, PeriodLedger};
use crate::error::{BookError, LedgerError, LedgerResult, StoreResult};
use crate::money::{Currency, Money};
use crate::period::PeriodKey;
use crate::reconcile::{Logged, Reconciler};
use crate::store::{KvStore, LedgerStore};

pub struct Book<K: KvStore> {
    store: LedgerStore<K>,
    reconciler: Reconciler,
    ledger: PeriodLedger,
}

impl<K: KvStore> Book<K> {
    pub fn open(store: LedgerStore<K>, primary: Currency, period: PeriodKey) -> StoreResult<Self> {
        let ledger = store.load(period)?;
        Ok(Self {
            store,
            reconciler: Reconciler::new(primary),
            ledger,
        })
    }

    pub fn ledger(&self) -> &PeriodLedger {
        &self.ledger
    }

    pub fn period(&self) -> PeriodKey {
        self.ledger.period
    }

    pub fn primary(&self) -> &Currency {
        self.reconciler.primary()
    }

    pub fn store(&self) -> &LedgerStore<K> {
        &self.store
    }

    pub fn summary(&self) -> LedgerResult<Summary> {
        Summary::of(&self.ledger, self.reconciler.primary())
    }

    pub fn create<E: Logged>(&mut self, entry: E) -> Result<EntryId, BookError> {
        let period = self.period();
        self.commit("create", E::KIND, |reconciler, ledger| {
            ensure_in_period(period, entry.date())?;
            reconciler.create(ledger, entry)
        })
    }

    pub fn edit<E: Logged>(&mut self, id: &str, patch: &E::Patch) -> Result<E, BookError> {
        let period = self.period();
        self.commit("edit", E::KIND, |reconciler, ledger| {
            let updated = reconciler.edit::<E>(ledger, id, patch)?;
            ensure_in_period(period, updated.date())?;
            Ok(updated)
        })
    }

    pub fn delete<E: Logged>(&mut self, id: &str) -> Result<E, BookError> {
        self.commit("delete", E::KIND, |reconciler, ledger| {
            reconciler.delete::<E>(ledger, id)
        })
    }

    pub fn transfer_wallet_to_savings(&mut self, amount: &Money) -> Result<(), BookError> {
        self.commit("transfer", "wallet", |reconciler, ledger| {
            reconciler.transfer_wallet_to_savings(ledger, amount)
        })
    }

    pub fn credit_savings_directly(&mut self, amount: &Money) -> Result<(), BookError> {
        self.commit("credit", "savings", |reconciler, ledger| {
            reconciler.credit_savings_directly(ledger, amount)
        })
    }

    /// Drops every entry and balance stored for this period.
    pub fn clear(&mut self) -> StoreResult<()> {
        let period = self.period();
        self.store.clear(period)?;
        self.ledger = PeriodLedger::empty(period);
        info!(%period, "period cleared");
        Ok(())
    }

    fn commit<T, F>(&mut self, action: &str, kind: &str, op: F) -> Result<T, BookError>
    where
        F: FnOnce(&Reconciler, &mut PeriodLedger) -> LedgerResult<T>,
    {
        let mut scratch = self.ledger.clone();
        let out = match op(&self.reconciler, &mut scratch) {
            Ok(out) => out,
            Err(err) => {
                warn!(period = %self.period(), action, kind, error = %err, "rejected");
                return Err(err.into());
            }
        };

        self.store.save(&scratch)?;
        self.ledger = scratch;
        info!(
            period = %self.period(),
            action,
            kind,
            wallet = self.ledger.wallet,
            savings = self.ledger.savings,
            "committed"
        );
        Ok(out)
    }
}

fn ensure_in_period(period: PeriodKey, date: NaiveDate) -> LedgerResult<()> {
    if !period.contains(date) {
        return Err(LedgerError::InvalidPeriod(format!(
            "{date} is outside {}",
            period.label()
        )));
    }
    Ok(())
}
