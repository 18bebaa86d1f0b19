//! extrato-ledger: fingerprint dedup, ledger stores, and the statement
//! importer that drives a full upload through the pipeline.

pub mod dedup;
pub mod error;
pub mod importer;
pub mod store;

pub use dedup::{DedupFilter, DedupOutcome, Filtered};
pub use error::{ImportError, StoreError};
pub use importer::{ImportReport, StatementImporter, StatementSource, DEFAULT_TIMEZONE};
pub use store::{CsvLedgerStore, MemoryStore, TransactionStore};
