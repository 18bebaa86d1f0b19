pub mod banco_do_brasil;
pub mod sicoob;

use extrato_core::Bank;

use crate::types::RawCandidate;

pub use banco_do_brasil::parse_banco_do_brasil_text;
pub use sicoob::parse_sicoob_text;

/// Run the grammar for `bank` over extracted text.
///
/// Returns `None` for [`Bank::Unknown`]: there is no grammar to guess with.
pub fn parse_candidates(text: &str, bank: Bank) -> Option<Vec<RawCandidate>> {
    match bank {
        Bank::Sicoob => Some(parse_sicoob_text(text)),
        Bank::BancoDoBrasil => Some(parse_banco_do_brasil_text(text)),
        Bank::Unknown => None,
    }
}
