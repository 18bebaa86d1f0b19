use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use extrato_core::Transaction;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Ledger, TransactionStore};
use crate::error::StoreError;

/// Ledger kept in a single CSV file, one row per transaction.
///
/// The file is read once on open. Every mutation rewrites it through a
/// temporary file and a rename, so a crash leaves either the old or the new
/// ledger on disk.
#[derive(Debug)]
pub struct CsvLedgerStore {
    path: PathBuf,
    ledger: Mutex<Ledger>,
}

impl CsvLedgerStore {
    /// Open an existing ledger, or start an empty one if the file is missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rows = match tokio::fs::read(&path).await {
            Ok(bytes) => read_rows(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), rows = rows.len(), "ledger opened");

        Ok(Self {
            path,
            ledger: Mutex::new(Ledger::from_rows(rows)?),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the ledger, write it out, then swap it in.
    async fn apply<T>(
        &self,
        change: impl FnOnce(&mut Ledger) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut current = self.ledger.lock().await;
        let mut next = current.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *current = next;
        Ok(out)
    }

    async fn persist(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let bytes = write_rows(ledger.rows())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("csv.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), rows = ledger.rows().len(), "ledger written");
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for CsvLedgerStore {
    async fn existing_fingerprints(
        &self,
        candidates: &HashSet<String>,
    ) -> Result<HashSet<String>, StoreError> {
        Ok(self.ledger.lock().await.existing(candidates))
    }

    async fn save_all(&self, txns: &[Transaction]) -> Result<Vec<Transaction>, StoreError> {
        self.apply(|ledger| ledger.insert_all(txns)).await?;
        Ok(txns.to_vec())
    }

    async fn save(&self, txn: &Transaction) -> Result<Transaction, StoreError> {
        self.apply(|ledger| ledger.insert(txn)).await?;
        Ok(txn.clone())
    }

    async fn delete_statement(&self, statement_id: Uuid) -> Result<usize, StoreError> {
        self.apply(|ledger| Ok(ledger.retain(|t| t.statement_id != statement_id)))
            .await
    }

    async fn purge_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError> {
        self.apply(|ledger| Ok(ledger.retain(|t| t.transaction_date >= cutoff)))
            .await
    }

    async fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.ledger.lock().await.rows().to_vec())
    }
}

fn read_rows(bytes: &[u8]) -> Result<Vec<Transaction>, StoreError> {
    let mut rdr = csv::Reader::from_reader(bytes);
    let rows = rdr.deserialize().collect::<Result<Vec<Transaction>, _>>()?;
    Ok(rows)
}

fn write_rows(rows: &[Transaction]) -> Result<Vec<u8>, StoreError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| StoreError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrato_core::{Bank, Category, NewTransaction, TransactionType};
    use rust_decimal::Decimal;

    fn txn(day: u32, document: Option<&str>, agency: Option<&str>) -> Transaction {
        Transaction::new(NewTransaction {
            transaction_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            document: document.map(str::to_string),
            history: "Pix - Recebido, FULANO".to_string(),
            amount: Decimal::new(150050, 2),
            transaction_type: TransactionType::Credit,
            category: Category::VendasPix,
            source_bank: Bank::BancoDoBrasil,
            source_agency: agency.map(str::to_string),
            batch: agency.map(|_| "14020".to_string()),
            statement_id: Uuid::new_v4(),
        })
    }

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::open(dir.path().join("ledger.csv")).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.csv");

        let a = txn(1, Some("12.345.678"), Some("0001"));
        let b = txn(2, None, None);
        {
            let store = CsvLedgerStore::open(&path).await.unwrap();
            store.save_all(&[a.clone(), b.clone()]).await.unwrap();
        }

        let reopened = CsvLedgerStore::open(&path).await.unwrap();
        let rows = reopened.list().await.unwrap();
        assert_eq!(rows, vec![a.clone(), b]);

        let err = reopened.save(&a).await.unwrap_err();
        assert!(err.is_uniqueness_violation());
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let store = CsvLedgerStore::open(&path).await.unwrap();
        let a = txn(1, None, None);
        store.save(&a).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        assert!(store.save_all(&[txn(5, None, None), a]).await.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_statement_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let a = txn(1, None, None);
        let b = txn(2, None, None);
        {
            let store = CsvLedgerStore::open(&path).await.unwrap();
            store.save_all(&[a.clone(), b.clone()]).await.unwrap();
            assert_eq!(store.delete_statement(a.statement_id).await.unwrap(), 1);
        }
        let rows = CsvLedgerStore::open(&path).await.unwrap().list().await.unwrap();
        assert_eq!(rows, vec![b]);
    }
}
