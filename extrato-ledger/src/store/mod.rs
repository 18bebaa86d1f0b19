//! Persistence contract for ledger transactions, plus two implementations:
//! an in-memory store and a CSV-file ledger.
//!
//! Stores enforce one row per fingerprint. Both insert operations report a
//! clash as [`StoreError::UniquenessViolation`] so callers can tell it apart
//! from real failures.

mod csv_file;
mod memory;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use extrato_core::Transaction;
use uuid::Uuid;

use crate::error::StoreError;

pub use csv_file::CsvLedgerStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Subset of `candidates` that is already stored.
    async fn existing_fingerprints(
        &self,
        candidates: &HashSet<String>,
    ) -> Result<HashSet<String>, StoreError>;

    /// Insert every transaction or none of them.
    async fn save_all(&self, txns: &[Transaction]) -> Result<Vec<Transaction>, StoreError>;

    async fn save(&self, txn: &Transaction) -> Result<Transaction, StoreError>;

    /// Remove a statement's transactions. Returns how many were removed.
    async fn delete_statement(&self, statement_id: Uuid) -> Result<usize, StoreError>;

    /// Remove transactions dated strictly before `cutoff`.
    async fn purge_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError>;

    /// Every stored transaction, in insertion order.
    async fn list(&self) -> Result<Vec<Transaction>, StoreError>;
}

#[async_trait]
impl<S: TransactionStore + ?Sized> TransactionStore for Arc<S> {
    async fn existing_fingerprints(
        &self,
        candidates: &HashSet<String>,
    ) -> Result<HashSet<String>, StoreError> {
        (**self).existing_fingerprints(candidates).await
    }

    async fn save_all(&self, txns: &[Transaction]) -> Result<Vec<Transaction>, StoreError> {
        (**self).save_all(txns).await
    }

    async fn save(&self, txn: &Transaction) -> Result<Transaction, StoreError> {
        (**self).save(txn).await
    }

    async fn delete_statement(&self, statement_id: Uuid) -> Result<usize, StoreError> {
        (**self).delete_statement(statement_id).await
    }

    async fn purge_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError> {
        (**self).purge_before(cutoff).await
    }

    async fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        (**self).list().await
    }
}

/// Rows plus a fingerprint index. Shared by both stores; callers provide the
/// locking.
#[derive(Debug, Default, Clone)]
pub(crate) struct Ledger {
    rows: Vec<Transaction>,
    fingerprints: HashSet<String>,
}

impl Ledger {
    pub(crate) fn from_rows(rows: Vec<Transaction>) -> Result<Self, StoreError> {
        let mut ledger = Ledger::default();
        ledger.insert_all(&rows)?;
        Ok(ledger)
    }

    pub(crate) fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub(crate) fn existing(&self, candidates: &HashSet<String>) -> HashSet<String> {
        candidates
            .iter()
            .filter(|fp| self.fingerprints.contains(*fp))
            .cloned()
            .collect()
    }

    pub(crate) fn insert(&mut self, txn: &Transaction) -> Result<(), StoreError> {
        if !self.fingerprints.insert(txn.fingerprint.clone()) {
            return Err(StoreError::UniquenessViolation {
                fingerprint: txn.fingerprint.clone(),
            });
        }
        self.rows.push(txn.clone());
        Ok(())
    }

    /// Validates the whole batch before touching anything.
    pub(crate) fn insert_all(&mut self, txns: &[Transaction]) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(txns.len());
        for txn in txns {
            if self.fingerprints.contains(&txn.fingerprint) || !seen.insert(&txn.fingerprint) {
                return Err(StoreError::UniquenessViolation {
                    fingerprint: txn.fingerprint.clone(),
                });
            }
        }
        for txn in txns {
            self.fingerprints.insert(txn.fingerprint.clone());
            self.rows.push(txn.clone());
        }
        Ok(())
    }

    pub(crate) fn retain(&mut self, keep: impl Fn(&Transaction) -> bool) -> usize {
        let before = self.rows.len();
        let fingerprints = &mut self.fingerprints;
        self.rows.retain(|txn| {
            let kept = keep(txn);
            if !kept {
                fingerprints.remove(&txn.fingerprint);
            }
            kept
        });
        before - self.rows.len()
    }
}
