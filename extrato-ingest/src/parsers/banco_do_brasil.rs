//! Banco do Brasil statement parser (extracted text)
//!
//! One regex per line:
//!   DATE       AGENCY BATCH CODE DESCRIPTION             AMOUNT   TYPE [AMOUNT2 TYPE2]
//!   02/03/2026 0001   14020 870  Pix - Recebido          1.500,00 C
//!   05/03/2026 3185   13105 393  TED Transf.Eletr.Dispon 200,00   D   200,00 C
//!
//! A second amount/type pair is a second leg of the same movement. The line
//! right after a transaction line, if it is not itself a transaction, is the
//! tail of the description. Only one line of lookahead is taken. Balance
//! rows ("Saldo Anterior", "S A L D O") match the grammar but are not
//! movements and are skipped.

use std::sync::LazyLock;

use extrato_core::{normalize_brl_number, Bank};
use regex::Regex;

use crate::types::{squash_whitespace, RawCandidate};

static TXN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?P<date>\d{2}/\d{2}/\d{4})\s+",
        r"(?P<agency>\d+)\s+",
        r"(?P<batch>\d+)\s+",
        r"\d+\s+",
        r"(?P<desc>.+?)\s+",
        r"(?P<amount>[\d.,]+)\s+(?P<kind>[CD])",
        r"(?:\s+(?P<amount2>[\d.,]+)\s+(?P<kind2>[CD]))?\s*$"
    ))
    .expect("static regex")
});

/// "Rende Fácil" automatic investment, optionally followed by a number
static RENDE_FACIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rende\s+f[aá]cil(?:\s+(\d[\d.,]*))?").expect("static regex")
});

/// Thousands-grouped number such as `12.345.678`
static GROUPED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}(?:\.\d{3})+\b").expect("static regex"));

const AGENCY_WIDTH: usize = 4;
const BATCH_WIDTH: usize = 5;

/// Parse extracted Banco do Brasil text into raw candidates, in statement order.
pub fn parse_banco_do_brasil_text(text: &str) -> Vec<RawCandidate> {
    let mut lines = text.lines().peekable();
    let mut out = Vec::new();

    while let Some(line) = lines.next() {
        let Some(caps) = TXN_LINE.captures(line) else {
            continue;
        };
        if is_balance(&caps["desc"]) {
            continue;
        }

        let mut description = caps["desc"].trim().to_string();
        if let Some(next) = lines.next_if(|l| is_continuation(l)) {
            description.push(' ');
            description.push_str(next.trim());
        }
        let (document, description) = extract_document(&description);

        let source_agency = fixed_width_digits(&caps["agency"], AGENCY_WIDTH);
        let batch = fixed_width_digits(&caps["batch"], BATCH_WIDTH);

        let mut legs = vec![(&caps["amount"], &caps["kind"])];
        if let (Some(amount), Some(kind)) = (caps.name("amount2"), caps.name("kind2")) {
            legs.push((amount.as_str(), kind.as_str()));
        }

        for (value, kind) in legs {
            let marker = if kind == "D" { 'D' } else { 'C' };
            let mut candidate = RawCandidate::new(
                Bank::BancoDoBrasil,
                &caps["date"],
                document.clone(),
                description.clone(),
                value,
                marker,
            );
            candidate.source_agency = source_agency.clone();
            candidate.batch = batch.clone();
            out.push(candidate);
        }
    }

    out
}

fn is_continuation(line: &str) -> bool {
    !line.trim().is_empty() && !is_balance(line) && !TXN_LINE.is_match(line)
}

/// "Saldo ...", also when letter-spaced as "S A L D O"
fn is_balance(text: &str) -> bool {
    text.to_uppercase().replace(' ', "").starts_with("SALDO")
}

/// Pull the document number out of a description.
///
/// Returns the document (if any) and the cleaned description.
pub fn extract_document(description: &str) -> (Option<String>, String) {
    if let Some(caps) = RENDE_FACIL.captures(description) {
        let document = caps.get(1).map(|m| normalize_brl_number(m.as_str()));
        let cleaned = RENDE_FACIL.replace(description, "Rende Fácil");
        return (document, squash_whitespace(&cleaned));
    }

    if let Some(m) = GROUPED_NUMBER.find(description) {
        let cleaned = format!("{} {}", &description[..m.start()], &description[m.end()..]);
        return (Some(m.as_str().to_string()), squash_whitespace(&cleaned));
    }

    (None, squash_whitespace(description))
}

fn fixed_width_digits(raw: &str, width: usize) -> Option<String> {
    (raw.len() == width && raw.chars().all(|c| c.is_ascii_digit())).then(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_leg_line() {
        let txns = parse_banco_do_brasil_text("02/03/2026 0001 14020 870 Pix - Recebido 1.500,00 C");
        assert_eq!(txns.len(), 1);
        let t = &txns[0];
        assert_eq!(t.date, "02/03/2026");
        assert_eq!(t.description, "Pix - Recebido");
        assert_eq!(t.value, "1.500,00");
        assert_eq!(t.marker, 'C');
        assert_eq!(t.source_agency.as_deref(), Some("0001"));
        assert_eq!(t.batch.as_deref(), Some("14020"));
        assert_eq!(t.document, None);
        assert_eq!(t.bank, Bank::BancoDoBrasil);
    }

    #[test]
    fn test_two_leg_line() {
        let txns = parse_banco_do_brasil_text(
            "05/03/2026 3185 13105 393 TED Transf.Eletr.Dispon 200,00 D 350,00 C",
        );
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].value, "200,00");
        assert_eq!(txns[0].marker, 'D');
        assert_eq!(txns[1].value, "350,00");
        assert_eq!(txns[1].marker, 'C');
        for t in &txns {
            assert_eq!(t.date, "05/03/2026");
            assert_eq!(t.description, "TED Transf.Eletr.Dispon");
        }
    }

    #[test]
    fn test_continuation_line() {
        let text = "06/03/2026 0001 14020 144 Pagamento de Boleto 89,90 D\nCOPASA MG\n07/03/2026 0001 14020 870 Pix - Recebido 10,00 C";
        let txns = parse_banco_do_brasil_text(text);
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "Pagamento de Boleto COPASA MG");
        assert_eq!(txns[1].description, "Pix - Recebido");
    }

    #[test]
    fn test_continuation_is_single_line() {
        let text = "06/03/2026 0001 14020 144 Pagamento de Boleto 89,90 D\nCOPASA MG\nRODAPE DA PAGINA";
        let txns = parse_banco_do_brasil_text(text);
        assert_eq!(txns[0].description, "Pagamento de Boleto COPASA MG");
    }

    #[test]
    fn test_continuation_applies_to_both_legs() {
        let text = "05/03/2026 3185 13105 393 TED 200,00 D 200,00 C\nJOAO DA SILVA";
        let txns = parse_banco_do_brasil_text(text);
        assert_eq!(txns.len(), 2);
        assert!(txns.iter().all(|t| t.description == "TED JOAO DA SILVA"));
    }

    #[test]
    fn test_blank_and_balance_lines_are_not_continuations() {
        let text = "06/03/2026 0001 14020 144 Pagamento 89,90 D\n\nCOPASA MG\n08/03/2026 0001 14020 144 Tarifa 5,00 D\nSaldo 1.000,00 C";
        let txns = parse_banco_do_brasil_text(text);
        assert_eq!(txns[0].description, "Pagamento");
        assert_eq!(txns[1].description, "Tarifa");
    }

    #[test]
    fn test_balance_rows_are_skipped() {
        let text = "02/03/2026 0000 00000 000 Saldo Anterior 8.200,00 C\n02/03/2026 3185 14020 870 Pix 1,00 C\n10/03/2026 0000 00000 999 S A L D O 8.201,00 C";
        let txns = parse_banco_do_brasil_text(text);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Pix");
    }

    #[test]
    fn test_agency_and_batch_require_exact_width() {
        let txns = parse_banco_do_brasil_text("02/03/2026 1 140200 870 Pix 1,00 C");
        assert_eq!(txns[0].source_agency, None);
        assert_eq!(txns[0].batch, None);

        let txns = parse_banco_do_brasil_text("02/03/2026 00012 1402 870 Pix 1,00 C");
        assert_eq!(txns[0].source_agency, None);
        assert_eq!(txns[0].batch, None);
    }

    #[test]
    fn test_grouped_number_is_document() {
        let (doc, desc) = extract_document("TRANSF 12.345.678 JOAO");
        assert_eq!(doc.as_deref(), Some("12.345.678"));
        assert_eq!(desc, "TRANSF JOAO");
    }

    #[test]
    fn test_rende_facil_document() {
        let (doc, desc) = extract_document("BB RENDE FACIL 9999,50");
        assert_eq!(doc.as_deref(), Some("9999.50"));
        assert_eq!(desc, "BB Rende Fácil");

        let (doc, desc) = extract_document("bb rende fácil");
        assert_eq!(doc, None);
        assert_eq!(desc, "bb Rende Fácil");
    }

    #[test]
    fn test_no_document() {
        let (doc, desc) = extract_document("  Pix -  Recebido ");
        assert_eq!(doc, None);
        assert_eq!(desc, "Pix - Recebido");
    }

    #[test]
    fn test_document_extracted_from_line() {
        let txns = parse_banco_do_brasil_text("09/03/2026 0001 14020 870 TRANSF 12.345.678 JOAO 50,00 D");
        assert_eq!(txns[0].document.as_deref(), Some("12.345.678"));
        assert_eq!(txns[0].description, "TRANSF JOAO");
    }
}
