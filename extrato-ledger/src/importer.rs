//! One statement upload, start to finish: grammar -> normalizer -> dedup ->
//! store.
//!
//! Parsing is synchronous and pure; the only I/O is the store. Imports of
//! different statements share nothing but the store, so they can run
//! concurrently.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use extrato_core::{Bank, Statement, Transaction};
use extrato_ingest::{parse_candidates, Normalizer};
use serde::Serialize;
use tracing::{field, info, instrument, Span};

use crate::dedup::DedupFilter;
use crate::error::ImportError;
use crate::store::TransactionStore;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Extracted statement text handed over by the caller.
#[derive(Debug, Clone)]
pub struct StatementSource {
    pub text: String,
    /// `Bank::Unknown` when the caller has no idea; the import is refused
    pub bank_hint: Bank,
    pub source_name: String,
}

impl StatementSource {
    pub fn new(text: impl Into<String>, bank_hint: Bank, source_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bank_hint,
            source_name: source_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub statement: Statement,
    /// Records recognized by the grammar
    pub candidates: usize,
    /// Records dropped for a bad date or amount
    pub dropped: usize,
    pub inserted: Vec<Transaction>,
    /// Already in the ledger before this import
    pub duplicates: usize,
    /// Stored by a concurrent import while this one ran
    pub lost_races: usize,
}

impl ImportReport {
    pub fn new_count(&self) -> usize {
        self.inserted.len()
    }
}

pub struct StatementImporter<S> {
    store: S,
    timezone: Tz,
}

impl<S: TransactionStore> StatementImporter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            timezone: DEFAULT_TIMEZONE,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Year given to `dd/MM` dates: the current calendar year in the
    /// configured timezone, regardless of what the statement covers.
    pub fn reference_year(&self, now: DateTime<Utc>) -> i32 {
        now.with_timezone(&self.timezone).year()
    }

    pub async fn import(&self, source: StatementSource) -> Result<ImportReport, ImportError> {
        self.import_at(source, Utc::now()).await
    }

    /// [`Self::import`] with an explicit clock.
    #[instrument(
        skip(self, source, now),
        fields(bank = %source.bank_hint, source = %source.source_name, statement_id = field::Empty)
    )]
    pub async fn import_at(
        &self,
        source: StatementSource,
        now: DateTime<Utc>,
    ) -> Result<ImportReport, ImportError> {
        if source.text.trim().is_empty() {
            return Err(ImportError::EmptyStatement);
        }
        let candidates = parse_candidates(&source.text, source.bank_hint)
            .ok_or(ImportError::UnrecognizedBank(source.bank_hint))?;

        let statement = Statement::new(source.bank_hint, source.source_name, now);
        Span::current().record("statement_id", field::display(statement.id));
        let normalized = Normalizer::new(self.reference_year(now), statement.id)
            .normalize_all(&candidates);

        let outcome = DedupFilter::new(&self.store)
            .persist_new(normalized.transactions)
            .await?;

        info!(
            candidates = candidates.len(),
            dropped = normalized.dropped.len(),
            inserted = outcome.inserted.len(),
            duplicates = outcome.already_present + outcome.repeated_in_batch,
            "statement imported"
        );

        Ok(ImportReport {
            statement,
            candidates: candidates.len(),
            dropped: normalized.dropped.len(),
            inserted: outcome.inserted,
            duplicates: outcome.already_present + outcome.repeated_in_batch,
            lost_races: outcome.lost_races,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    #[test]
    fn test_reference_year_follows_timezone() {
        let importer = StatementImporter::new(MemoryStore::new());
        // 02:00 UTC on Jan 1st is still Dec 31st in São Paulo
        let now = Utc.with_ymd_and_hms(2027, 1, 1, 2, 0, 0).unwrap();
        assert_eq!(importer.reference_year(now), 2026);

        let utc = StatementImporter::new(MemoryStore::new()).with_timezone(chrono_tz::UTC);
        assert_eq!(utc.reference_year(now), 2027);
    }

    #[tokio::test]
    async fn test_empty_statement_is_rejected() {
        let importer = StatementImporter::new(MemoryStore::new());
        let err = importer
            .import(StatementSource::new("  \n ", Bank::Sicoob, "empty.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::EmptyStatement));
    }

    #[tokio::test]
    async fn test_unknown_bank_is_rejected() {
        let importer = StatementImporter::new(MemoryStore::new());
        let err = importer
            .import(StatementSource::new("01/02 1 X\nR$ 1,00C", Bank::Unknown, "x.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnrecognizedBank(Bank::Unknown)));
        assert!(importer.store().is_empty().await);
    }
}
