//! Fingerprint-based dedup in front of the store.
//!
//! Two phases: ask the store which fingerprints it already has, drop those,
//! then bulk insert the rest. A concurrent import can still win the race
//! between the check and the insert; when the bulk insert reports a
//! uniqueness violation the batch is retried one row at a time and rows that
//! now collide are skipped. Rows committed before a hard failure stay
//! committed.

use std::collections::HashSet;

use extrato_core::Transaction;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::store::TransactionStore;

/// Result of [`DedupFilter::filter_new`]
#[derive(Debug, Default)]
pub struct Filtered {
    /// Transactions the store does not know about yet, in input order
    pub fresh: Vec<Transaction>,
    /// Dropped because the store already had the fingerprint
    pub already_present: usize,
    /// Dropped because an earlier row in the same batch had the fingerprint
    pub repeated_in_batch: usize,
}

/// Result of [`DedupFilter::persist_new`]
#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub inserted: Vec<Transaction>,
    pub already_present: usize,
    pub repeated_in_batch: usize,
    /// Rows another import stored between our check and our insert
    pub lost_races: usize,
}

pub struct DedupFilter<'a, S: TransactionStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: TransactionStore + ?Sized> DedupFilter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Keep only the transactions whose fingerprint is not stored yet.
    pub async fn filter_new(&self, batch: Vec<Transaction>) -> Result<Filtered, StoreError> {
        let mut out = Filtered::default();

        let mut seen = HashSet::with_capacity(batch.len());
        let mut unique = Vec::with_capacity(batch.len());
        for txn in batch {
            if seen.insert(txn.fingerprint.clone()) {
                unique.push(txn);
            } else {
                debug!(fingerprint = %txn.fingerprint, "repeated fingerprint within batch");
                out.repeated_in_batch += 1;
            }
        }

        let existing = self.store.existing_fingerprints(&seen).await?;
        for txn in unique {
            if existing.contains(&txn.fingerprint) {
                out.already_present += 1;
            } else {
                out.fresh.push(txn);
            }
        }

        Ok(out)
    }

    /// Filter the batch and store what is new.
    pub async fn persist_new(&self, batch: Vec<Transaction>) -> Result<DedupOutcome, StoreError> {
        let filtered = self.filter_new(batch).await?;
        let mut outcome = DedupOutcome {
            inserted: Vec::new(),
            already_present: filtered.already_present,
            repeated_in_batch: filtered.repeated_in_batch,
            lost_races: 0,
        };

        if filtered.fresh.is_empty() {
            return Ok(outcome);
        }

        match self.store.save_all(&filtered.fresh).await {
            Ok(saved) => outcome.inserted = saved,
            Err(StoreError::UniquenessViolation { fingerprint }) => {
                warn!(
                    %fingerprint,
                    batch = filtered.fresh.len(),
                    "bulk insert hit an existing fingerprint, inserting one by one"
                );
                for txn in &filtered.fresh {
                    match self.store.save(txn).await {
                        Ok(saved) => outcome.inserted.push(saved),
                        Err(StoreError::UniquenessViolation { fingerprint }) => {
                            debug!(%fingerprint, "skipping transaction stored concurrently");
                            outcome.lost_races += 1;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
            Err(e) => return Err(e),
        }

        info!(
            inserted = outcome.inserted.len(),
            already_present = outcome.already_present,
            lost_races = outcome.lost_races,
            "dedup complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use extrato_core::{Bank, Category, NewTransaction, TransactionType};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn txn(day: u32, cents: i64) -> Transaction {
        Transaction::new(NewTransaction {
            transaction_date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            document: None,
            history: "PIX RECEBIDO".to_string(),
            amount: Decimal::new(cents, 2),
            transaction_type: TransactionType::Credit,
            category: Category::VendasPix,
            source_bank: Bank::Sicoob,
            source_agency: None,
            batch: None,
            statement_id: Uuid::nil(),
        })
    }

    #[tokio::test]
    async fn test_filter_new_drops_stored_fingerprints() {
        let store = MemoryStore::new();
        store.save(&txn(1, 100)).await.unwrap();

        let filtered = DedupFilter::new(&store)
            .filter_new(vec![txn(1, 100), txn(2, 100), txn(2, 100), txn(3, 100)])
            .await
            .unwrap();
        assert_eq!(filtered.fresh.len(), 2);
        assert_eq!(filtered.already_present, 1);
        assert_eq!(filtered.repeated_in_batch, 1);
    }

    #[tokio::test]
    async fn test_persist_new_twice_is_idempotent() {
        let store = MemoryStore::new();
        let filter = DedupFilter::new(&store);

        let first = filter.persist_new(vec![txn(1, 100), txn(2, 200)]).await.unwrap();
        assert_eq!(first.inserted.len(), 2);

        let second = filter.persist_new(vec![txn(1, 100), txn(2, 200)]).await.unwrap();
        assert!(second.inserted.is_empty());
        assert_eq!(second.already_present, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let store = MemoryStore::new();
        let outcome = DedupFilter::new(&store).persist_new(Vec::new()).await.unwrap();
        assert!(outcome.inserted.is_empty());
        assert_eq!(outcome.already_present, 0);
    }
}
