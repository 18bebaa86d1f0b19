//! Raw candidate -> canonical [`Transaction`].
//!
//! Sign convention: `D` makes the amount negative and the type DEBIT,
//! anything else is a positive CREDIT. A zero amount has no sign, so it is
//! only accepted on placeholders (which are zero debits). The fingerprint is
//! taken last, over the final description.

use extrato_core::{
    classify, parse_brl_amount, parse_statement_date, Category, NewTransaction, ParseError,
    Transaction, TransactionType,
};
use tracing::warn;
use uuid::Uuid;

use crate::types::{squash_whitespace, RawCandidate};

/// Normalizes the candidates of one statement.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    /// Year given to `dd/MM` dates
    reference_year: i32,
    statement_id: Uuid,
}

/// Output of [`Normalizer::normalize_all`]
#[derive(Debug, Default)]
pub struct Normalized {
    pub transactions: Vec<Transaction>,
    /// Candidates that failed to parse, with their position in the input
    pub dropped: Vec<(usize, ParseError)>,
}

impl Normalizer {
    pub fn new(reference_year: i32, statement_id: Uuid) -> Self {
        Self {
            reference_year,
            statement_id,
        }
    }

    pub fn normalize(&self, candidate: &RawCandidate) -> Result<Transaction, ParseError> {
        let transaction_date = parse_statement_date(&candidate.date, self.reference_year)?;
        let magnitude = parse_brl_amount(&candidate.value)?;
        if magnitude.is_zero() && !candidate.placeholder {
            return Err(ParseError::invalid_amount(&candidate.value));
        }

        let transaction_type = TransactionType::from_marker(candidate.marker);
        let amount = if transaction_type == TransactionType::Debit && !magnitude.is_zero() {
            -magnitude
        } else {
            magnitude
        };

        let history = squash_whitespace(&candidate.description);
        let category = if candidate.placeholder {
            Category::Fornecedor
        } else {
            classify(&history.to_lowercase(), transaction_type)
        };

        Ok(Transaction::new(NewTransaction {
            transaction_date,
            document: candidate.document.clone().filter(|d| !d.is_empty()),
            history,
            amount,
            transaction_type,
            category,
            source_bank: candidate.bank,
            source_agency: candidate.source_agency.clone(),
            batch: candidate.batch.clone(),
            statement_id: self.statement_id,
        }))
    }

    /// Normalize every candidate; failures are logged and skipped.
    pub fn normalize_all(&self, candidates: &[RawCandidate]) -> Normalized {
        let mut out = Normalized::default();
        for (index, candidate) in candidates.iter().enumerate() {
            match self.normalize(candidate) {
                Ok(txn) => out.transactions.push(txn),
                Err(err) => {
                    warn!(
                        index,
                        bank = %candidate.bank,
                        description = %candidate.description,
                        error = %err,
                        "dropping unparseable candidate"
                    );
                    out.dropped.push((index, err));
                }
            }
        }
        out
    }
}
