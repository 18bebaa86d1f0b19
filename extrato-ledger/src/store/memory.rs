use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use extrato_core::Transaction;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Ledger, TransactionStore};
use crate::error::StoreError;

/// Process-local store. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.ledger.lock().await.rows().len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn existing_fingerprints(
        &self,
        candidates: &HashSet<String>,
    ) -> Result<HashSet<String>, StoreError> {
        Ok(self.ledger.lock().await.existing(candidates))
    }

    async fn save_all(&self, txns: &[Transaction]) -> Result<Vec<Transaction>, StoreError> {
        self.ledger.lock().await.insert_all(txns)?;
        Ok(txns.to_vec())
    }

    async fn save(&self, txn: &Transaction) -> Result<Transaction, StoreError> {
        self.ledger.lock().await.insert(txn)?;
        Ok(txn.clone())
    }

    async fn delete_statement(&self, statement_id: Uuid) -> Result<usize, StoreError> {
        Ok(self.ledger.lock().await.retain(|t| t.statement_id != statement_id))
    }

    async fn purge_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError> {
        Ok(self.ledger.lock().await.retain(|t| t.transaction_date >= cutoff))
    }

    async fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.ledger.lock().await.rows().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrato_core::{Bank, Category, NewTransaction, TransactionType};
    use rust_decimal::Decimal;

    fn txn(day: u32, history: &str, statement_id: Uuid) -> Transaction {
        Transaction::new(NewTransaction {
            transaction_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            document: None,
            history: history.to_string(),
            amount: Decimal::new(-1000, 2),
            transaction_type: TransactionType::Debit,
            category: Category::Fornecedor,
            source_bank: Bank::Sicoob,
            source_agency: None,
            batch: None,
            statement_id,
        })
    }

    #[tokio::test]
    async fn test_save_all_is_all_or_nothing() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.save(&txn(1, "A", id)).await.unwrap();

        let err = store
            .save_all(&[txn(2, "B", id), txn(1, "A", id)])
            .await
            .unwrap_err();
        assert!(err.is_uniqueness_violation());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_all_rejects_repeats_within_batch() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let err = store.save_all(&[txn(2, "B", id), txn(2, "B", id)]).await.unwrap_err();
        assert!(err.is_uniqueness_violation());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_statement_cascades() {
        let store = MemoryStore::new();
        let keep = Uuid::new_v4();
        let gone = Uuid::new_v4();
        store
            .save_all(&[txn(1, "A", keep), txn(2, "B", gone), txn(3, "C", gone)])
            .await
            .unwrap();

        assert_eq!(store.delete_statement(gone).await.unwrap(), 2);
        let rows = store.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].statement_id, keep);

        // Removed fingerprints can be stored again
        store.save(&txn(2, "B", keep)).await.unwrap();
    }

    #[tokio::test]
    async fn test_purge_before_cutoff() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .save_all(&[txn(1, "A", id), txn(10, "B", id), txn(20, "C", id)])
            .await
            .unwrap();

        let cutoff = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(store.purge_before(cutoff).await.unwrap(), 1);
        let remaining = store.list().await.unwrap();
        assert!(remaining.iter().all(|t| t.transaction_date >= cutoff));
    }
}
