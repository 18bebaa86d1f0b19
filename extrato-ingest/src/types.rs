use extrato_core::Bank;
use serde::{Deserialize, Serialize};

/// Parsed-but-not-normalized record emitted by a bank grammar.
///
/// Every field is still statement text; nothing here has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// `dd/MM` or `dd/MM/yyyy`
    pub date: String,
    pub document: Option<String>,
    pub description: String,
    /// Locale-formatted value, e.g. `1.234,56`
    pub value: String,
    /// `D` or `C`
    pub marker: char,
    pub bank: Bank,
    pub source_agency: Option<String>,
    pub batch: Option<String>,
    /// Set for records that never reached a value line; normalized as a
    /// zero-value supplier debit.
    pub placeholder: bool,
}

impl RawCandidate {
    pub(crate) fn new(
        bank: Bank,
        date: impl Into<String>,
        document: Option<String>,
        description: impl Into<String>,
        value: impl Into<String>,
        marker: char,
    ) -> Self {
        Self {
            date: date.into(),
            document,
            description: description.into(),
            value: value.into(),
            marker,
            bank,
            source_agency: None,
            batch: None,
            placeholder: false,
        }
    }
}

/// Collapse runs of whitespace and trim.
pub(crate) fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
