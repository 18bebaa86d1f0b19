//! Brazilian locale numbers and dates, plus the transaction fingerprint.
//!
//! Statement amounts look like `1.234,56` (dot for thousands, comma for
//! decimals). Dates are either `dd/MM` (year implied) or `dd/MM/yyyy`.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::error::ParseError;

static SHORT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})/(\d{2})$").expect("static regex"));
static FULL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").expect("static regex"));

/// Parse a Brazilian-format decimal (`1.234,56`) into an unsigned amount.
///
/// Thousands separators are stripped and the decimal comma becomes a dot.
pub fn parse_brl_amount(raw: &str) -> Result<Decimal, ParseError> {
    let normalized = normalize_brl_number(raw);
    if normalized.is_empty() {
        return Err(ParseError::invalid_amount(raw));
    }
    Decimal::from_str(&normalized)
        .map(|d| d.round_dp(2))
        .map_err(|_| ParseError::invalid_amount(raw))
}

/// `1.234,56` -> `1234.56`. No validation.
pub fn normalize_brl_number(raw: &str) -> String {
    raw.trim().replace('.', "").replace(',', ".")
}

/// Parse `dd/MM/yyyy`, or `dd/MM` completed with `reference_year`.
pub fn parse_statement_date(raw: &str, reference_year: i32) -> Result<NaiveDate, ParseError> {
    let s = raw.trim();

    let (day, month, year) = if let Some(caps) = FULL_DATE.captures(s) {
        (caps[1].parse::<u32>(), caps[2].parse::<u32>(), caps[3].parse::<i32>())
    } else if let Some(caps) = SHORT_DATE.captures(s) {
        (caps[1].parse::<u32>(), caps[2].parse::<u32>(), Ok(reference_year))
    } else {
        return Err(ParseError::invalid_date(raw));
    };

    match (day, month, year) {
        (Ok(d), Ok(m), Ok(y)) => {
            NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| ParseError::invalid_date(raw))
        }
        _ => Err(ParseError::invalid_date(raw)),
    }
}

/// Deterministic dedup key over `(date, document-or-empty, amount, history)`.
///
/// The amount is rendered with exactly two decimals so `-150`, `-150.0` and
/// `-150.00` hash the same. Output is lowercase hex SHA-256.
pub fn fingerprint(date: NaiveDate, document: Option<&str>, amount: Decimal, history: &str) -> String {
    let mut amount = amount.round_dp(2);
    amount.rescale(2);

    let payload = format!(
        "{}|{}|{}|{}",
        date.format("%Y-%m-%d"),
        document.unwrap_or(""),
        amount,
        history
    );

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}
