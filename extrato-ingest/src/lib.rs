//! extrato-ingest: bank statement grammars (extracted PDF text) and the
//! normalizer that turns their raw candidates into ledger transactions.

pub mod normalize;
pub mod parsers;
pub mod types;

pub use normalize::{Normalized, Normalizer};
pub use parsers::parse_candidates;
pub use types::RawCandidate;
