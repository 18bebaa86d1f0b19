//! extrato-core: ledger types, Brazilian number/date parsing, fingerprints, and
//! the keyword categorizer shared by every statement grammar.

pub mod categorizer;
pub mod error;
pub mod money;
pub mod transaction;

pub use categorizer::{classify, match_keyword, KEYWORD_TABLE};
pub use error::{ParseError, ParseErrorKind};
pub use money::{fingerprint, normalize_brl_number, parse_brl_amount, parse_statement_date};
pub use transaction::{Bank, Category, NewTransaction, Statement, Transaction, TransactionType};
