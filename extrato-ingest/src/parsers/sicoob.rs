//! Sicoob statement parser (extracted text)
//!
//! Records span several lines. A `DD/MM` line opens a record, free text
//! follows, and an `R$ <value><D|C>` line closes it:
//!
//!   01/02 123 COMPRA SUPERMERCADO
//!   LOJA CENTRO
//!   R$ 150,00D
//!
//! The token right after the date is the document number. Balance rows, bare
//! timestamps and the internet-banking header/footer are noise and are
//! skipped wherever they appear. Markers only count at the start of a line
//! (or of an anchor's body), so a name like "ISAC" inside a description is
//! kept.

use std::sync::LazyLock;

use extrato_core::Bank;
use regex::Regex;
use tracing::debug;

use crate::types::{squash_whitespace, RawCandidate};

/// `DD/MM` not followed by `/`, then the rest of the line
static DATE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}/\d{2})(?:\s+(.*))?$").expect("static regex"));

static VALUE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"R\$\s*(\d[\d.,]*)\s*([DC])\b").expect("static regex"));

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{2}/\d{2}/\d{4}\s+)?\d{2}:\d{2}(?::\d{2})?$").expect("static regex")
});

/// Balance rows; these may also sit on a date anchor line
const BALANCE_MARKERS: &[&str] = &["SALDO DO DIA", "SALDO ANTERIOR", "SALDO BLOQUEADO"];

/// Internet-banking header and footer lines
const FOOTER_MARKERS: &[&str] = &["SICOOBNET", "SISBR", "OUVIDORIA", "SAC "];

/// Value used for records that never reached a value line
const PLACEHOLDER_VALUE: &str = "0,00";

/// Lines that never carry transaction data.
///
/// A date anchor is boilerplate only when its body is a balance row.
pub fn is_boilerplate(line: &str) -> bool {
    let line = line.trim();
    if let Some(caps) = DATE_ANCHOR.captures(line) {
        let body = caps.get(2).map_or("", |m| m.as_str());
        return starts_with_any(body, BALANCE_MARKERS);
    }
    starts_with_any(line, BALANCE_MARKERS)
        || starts_with_any(line, FOOTER_MARKERS)
        || TIMESTAMP.is_match(line)
}

fn starts_with_any(text: &str, markers: &[&str]) -> bool {
    let upper = text.trim_start().to_uppercase();
    markers.iter().any(|m| upper.starts_with(m))
}

/// A record that has seen its date anchor but not yet its value anchor.
#[derive(Debug)]
struct Pending {
    date: String,
    document: Option<String>,
    parts: Vec<String>,
}

impl Pending {
    fn new(date: &str, document: Option<String>) -> Self {
        Self {
            date: date.to_string(),
            document,
            parts: Vec::new(),
        }
    }

    fn push(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.parts.push(text.to_string());
        }
    }

    fn description(&self) -> String {
        squash_whitespace(&self.parts.join(" "))
    }

    fn close(self, value: &str, marker: char) -> RawCandidate {
        let description = self.description();
        RawCandidate::new(Bank::Sicoob, self.date, self.document, description, value, marker)
    }

    /// Incomplete records become zero-value debits instead of being dropped,
    /// as long as they collected some description.
    fn close_without_value(self, out: &mut Vec<RawCandidate>) {
        if self.parts.is_empty() {
            debug!(date = %self.date, "dropping sicoob record with no description");
            return;
        }
        debug!(date = %self.date, "sicoob record has no value line, emitting placeholder");
        let mut candidate = self.close(PLACEHOLDER_VALUE, 'D');
        candidate.placeholder = true;
        out.push(candidate);
    }
}

#[derive(Debug)]
enum State {
    SeekingAnchor,
    Accumulating(Pending),
}

/// Parse extracted Sicoob text into raw candidates, in statement order.
///
/// Dates are left as `DD/MM`; the normalizer supplies the year.
pub fn parse_sicoob_text(text: &str) -> Vec<RawCandidate> {
    let mut state = State::SeekingAnchor;
    let mut out = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || is_boilerplate(line) {
            continue;
        }
        state = step(state, line, &mut out);
    }

    if let State::Accumulating(pending) = state {
        pending.close_without_value(&mut out);
    }

    out
}

fn step(state: State, line: &str, out: &mut Vec<RawCandidate>) -> State {
    let (mut pending, body) = match DATE_ANCHOR.captures(line) {
        Some(caps) => {
            if let State::Accumulating(previous) = state {
                previous.close_without_value(out);
            }
            let rest = caps.get(2).map_or("", |m| m.as_str());
            let (document, body) = split_document(rest);
            (Pending::new(&caps[1], document), body)
        }
        None => match state {
            State::SeekingAnchor => return State::SeekingAnchor,
            State::Accumulating(pending) => (pending, line),
        },
    };

    match VALUE_ANCHOR.captures(body) {
        Some(caps) => {
            let marker = if &caps[2] == "D" { 'D' } else { 'C' };
            pending.push(&body.replacen(&caps[0], " ", 1));
            out.push(pending.close(&caps[1], marker));
            State::SeekingAnchor
        }
        None => {
            pending.push(body);
            State::Accumulating(pending)
        }
    }
}

/// The token after the date is the document number. A value written straight
/// after the date (`R$ ...`) is not a token.
fn split_document(rest: &str) -> (Option<String>, &str) {
    let rest = rest.trim_start();
    let (first, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

    if first.is_empty() || first.starts_with("R$") {
        (None, rest)
    } else {
        (Some(first.to_string()), tail)
    }
}
