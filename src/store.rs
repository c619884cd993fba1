use rusqlite::{Connection, OptionalExtension, params};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::domain::PeriodLedger;
use crate::error::{StoreError, StoreResult};
use crate::period::PeriodKey;

const PERIOD_PREFIX: &str = "period:";

/// Durable string key-value storage. Each call either fully happens or fails.
pub trait KvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    /// Keys starting with `prefix`, sorted.
    fn keys(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

/// `KvStore` backed by a single SQLite table.
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let kv = Self { conn };
        kv.migrate()?;
        Ok(kv)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let kv = Self {
            conn: Connection::open_in_memory()?,
        };
        kv.migrate()?;
        Ok(kv)
    }

    fn migrate(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key ASC")?;
        let rows = stmt.query_map(params![prefix], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// In-process `KvStore`; nothing survives the value being dropped.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .entries
            .borrow()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Maps period keys to ledgers. The only reader and writer of the `KvStore`.
pub struct LedgerStore<K: KvStore> {
    kv: K,
}

impl<K: KvStore> LedgerStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    fn key(period: PeriodKey) -> String {
        format!("{PERIOD_PREFIX}{period}")
    }

    /// The stored ledger, or an empty one if the period has never been written.
    pub fn load(&self, period: PeriodKey) -> StoreResult<PeriodLedger> {
        let key = Self::key(period);
        let Some(raw) = self.kv.get(&key)? else {
            debug!(%period, "no snapshot, starting empty");
            return Ok(PeriodLedger::empty(period));
        };

        let mut ledger: PeriodLedger =
            serde_json::from_str(&raw).map_err(|source| StoreError::Snapshot {
                key: key.clone(),
                source,
            })?;
        ledger.period = period;
        debug!(
            %period,
            income = ledger.income.len(),
            expenses = ledger.expenses.len(),
            lending = ledger.lending.len(),
            "loaded snapshot"
        );
        Ok(ledger)
    }

    pub fn save(&self, ledger: &PeriodLedger) -> StoreResult<()> {
        let json = serde_json::to_string(ledger)?;
        self.kv.set(&Self::key(ledger.period), &json)?;
        debug!(period = %ledger.period, bytes = json.len(), "saved snapshot");
        Ok(())
    }

    pub fn clear(&self, period: PeriodKey) -> StoreResult<()> {
        self.kv.remove(&Self::key(period))?;
        debug!(%period, "cleared snapshot");
        Ok(())
    }

    /// Periods holding a snapshot, oldest first.
    pub fn periods(&self) -> StoreResult<Vec<PeriodKey>> {
        let mut out = Vec::new();
        for key in self.kv.keys(PERIOD_PREFIX)? {
            if let Some(period) = key
                .strip_prefix(PERIOD_PREFIX)
                .and_then(|raw| raw.parse::<PeriodKey>().ok())
            {
                out.push(period);
            }
        }
        out.sort();
        Ok(out)
    }
}
