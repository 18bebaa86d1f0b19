use extrato_core::Bank;
use thiserror::Error;

/// Failures reported by a [`crate::TransactionStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The fingerprint is already stored. Recoverable: the dedup filter
    /// skips the record.
    #[error("transaction {fingerprint} already exists")]
    UniquenessViolation { fingerprint: String },

    #[error("ledger file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger file format: {0}")]
    Csv(#[from] csv::Error),

    #[error("store backend: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, StoreError::UniquenessViolation { .. })
    }
}

/// Whole-statement failures. Per-line parse problems never surface here;
/// they only lower the number of imported transactions.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("statement text is empty")]
    EmptyStatement,

    #[error("no statement grammar for bank {0}")]
    UnrecognizedBank(Bank),

    #[error(transparent)]
    Store(#[from] StoreError),
}
