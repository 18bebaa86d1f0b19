use thiserror::Error;

/// Which field of a candidate failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidDate,
    InvalidAmount,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::InvalidDate => f.write_str("invalid date format"),
            ParseErrorKind::InvalidAmount => f.write_str("invalid amount format"),
        }
    }
}

/// Per-record parse failure. The offending candidate is dropped; the rest
/// of the statement keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {token:?}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The raw token that was rejected
    pub token: String,
}

impl ParseError {
    pub fn invalid_date(token: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::InvalidDate,
            token: token.into(),
        }
    }

    pub fn invalid_amount(token: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::InvalidAmount,
            token: token.into(),
        }
    }
}
