//! PostgreSQL Ledger Store
//!
//! `PgLedgerStore::begin` opens a database transaction; each repository
//! trait is implemented on `PgLedgerTx` in its own module. `lock_*` reads
//! use `SELECT ... FOR UPDATE`, guarded writes put their guard in the
//! `WHERE` clause and report a rejected guard as `None`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use grindstone::{DomainError, LedgerStore, LedgerTx};

mod activity;
mod balance;
mod boss;
mod campaign;
mod quest;
mod shop;

/// PostgreSQL implementation of LedgerStore
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        Ok(Box::new(PgLedgerTx { tx }))
    }
}

/// One open database transaction. Dropping it rolls back.
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))
    }
}

/// Parse a text column into a closed enum, treating bad data as a store error
fn parse_column<T>(column: &str, value: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e| DomainError::Repository(format!("bad {column} value {value:?}: {e}")))
}
