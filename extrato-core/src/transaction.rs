//! Ledger record types: statements, transactions, and their tags

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::fingerprint;

/// Bank that issued a statement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bank {
    Sicoob,
    BancoDoBrasil,
    Unknown,
}

impl Bank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bank::Sicoob => "SICOOB",
            Bank::BancoDoBrasil => "BANCO_DO_BRASIL",
            Bank::Unknown => "UNKNOWN",
        }
    }

    /// Parse a user-supplied bank name. Accepts the serialized form plus
    /// common short names (`bb`, `banco-do-brasil`).
    pub fn from_name(name: &str) -> Bank {
        let n = name.trim().to_lowercase().replace(['-', '_', ' '], "");
        match n.as_str() {
            "sicoob" => Bank::Sicoob,
            "bb" | "bancodobrasil" => Bank::BancoDoBrasil,
            _ => Bank::Unknown,
        }
    }
}

impl std::fmt::Display for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a movement, from the account holder's point of view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    /// Map a statement D/C marker. Anything other than `D` is a credit.
    pub fn from_marker(marker: char) -> TransactionType {
        if marker.eq_ignore_ascii_case(&'D') {
            TransactionType::Debit
        } else {
            TransactionType::Credit
        }
    }
}

/// Business categories. Closed set; derived by the categorizer, never
/// supplied by the user at parse time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    VendasPix,
    VendasCartao,
    Fornecedor,
    FolhaPagamento,
    ProLabore,
    Impostos,
    TarifasBancarias,
    Aluguel,
    Energia,
    AguaSaneamento,
    TelefoneInternet,
    Combustivel,
    Emprestimos,
    AplicacaoFinanceira,
    Transferencias,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::VendasPix => "VENDAS_PIX",
            Category::VendasCartao => "VENDAS_CARTAO",
            Category::Fornecedor => "FORNECEDOR",
            Category::FolhaPagamento => "FOLHA_PAGAMENTO",
            Category::ProLabore => "PRO_LABORE",
            Category::Impostos => "IMPOSTOS",
            Category::TarifasBancarias => "TARIFAS_BANCARIAS",
            Category::Aluguel => "ALUGUEL",
            Category::Energia => "ENERGIA",
            Category::AguaSaneamento => "AGUA_SANEAMENTO",
            Category::TelefoneInternet => "TELEFONE_INTERNET",
            Category::Combustivel => "COMBUSTIVEL",
            Category::Emprestimos => "EMPRESTIMOS",
            Category::AplicacaoFinanceira => "APLICACAO_FINANCEIRA",
            Category::Transferencias => "TRANSFERENCIAS",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded bank document. Owns its transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statement {
    pub id: Uuid,
    pub bank: Bank,
    /// File name or other caller-supplied label
    pub source_name: String,
    pub imported_at: DateTime<Utc>,
}

impl Statement {
    pub fn new(bank: Bank, source_name: impl Into<String>, imported_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bank,
            source_name: source_name.into(),
            imported_at,
        }
    }
}

/// A canonical ledger record. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub transaction_date: NaiveDate,
    /// Bank-assigned document/reference number; format varies by bank
    pub document: Option<String>,
    /// Normalized description
    pub history: String,
    /// Negative = debit, positive = credit
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: Category,
    pub source_bank: Bank,
    /// Exactly 4 digits when present (Banco do Brasil only)
    pub source_agency: Option<String>,
    /// Exactly 5 digits when present (Banco do Brasil only)
    pub batch: Option<String>,
    /// Dedup key, see [`fingerprint`]
    pub fingerprint: String,
    /// Owning statement
    pub statement_id: Uuid,
}

/// Field bundle for [`Transaction::new`]; the fingerprint is derived, not supplied.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_date: NaiveDate,
    pub document: Option<String>,
    pub history: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: Category,
    pub source_bank: Bank,
    pub source_agency: Option<String>,
    pub batch: Option<String>,
    pub statement_id: Uuid,
}

impl Transaction {
    pub fn new(fields: NewTransaction) -> Self {
        let fingerprint = fingerprint(
            fields.transaction_date,
            fields.document.as_deref(),
            fields.amount,
            &fields.history,
        );
        Self {
            transaction_date: fields.transaction_date,
            document: fields.document,
            history: fields.history,
            amount: fields.amount,
            transaction_type: fields.transaction_type,
            category: fields.category,
            source_bank: fields.source_bank,
            source_agency: fields.source_agency,
            batch: fields.batch,
            fingerprint,
            statement_id: fields.statement_id,
        }
    }

    pub fn is_debit(&self) -> bool {
        self.transaction_type == TransactionType::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.transaction_type == TransactionType::Credit
    }

    /// True when the sign of `amount` agrees with `transaction_type`.
    /// Zero is accepted for debits (unterminated-record placeholders).
    pub fn sign_is_consistent(&self) -> bool {
        (self.is_debit() && self.amount <= Decimal::ZERO)
            || (self.is_credit() && self.amount > Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample(amount: &str, kind: TransactionType) -> Transaction {
        Transaction::new(NewTransaction {
            transaction_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            document: Some("123".to_string()),
            history: "COMPRA SUPERMERCADO".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            transaction_type: kind,
            category: Category::Fornecedor,
            source_bank: Bank::Sicoob,
            source_agency: None,
            batch: None,
            statement_id: Uuid::nil(),
        })
    }

    #[test]
    fn test_fingerprint_is_derived_on_creation() {
        let t = sample("-150.00", TransactionType::Debit);
        assert_eq!(t.fingerprint.len(), 64);
        assert_eq!(
            t.fingerprint,
            fingerprint(t.transaction_date, Some("123"), t.amount, "COMPRA SUPERMERCADO")
        );
    }

    #[test]
    fn test_sign_consistency() {
        assert!(sample("-150.00", TransactionType::Debit).sign_is_consistent());
        assert!(sample("0", TransactionType::Debit).sign_is_consistent());
        assert!(sample("10.00", TransactionType::Credit).sign_is_consistent());
        assert!(!sample("10.00", TransactionType::Debit).sign_is_consistent());
        assert!(!sample("0", TransactionType::Credit).sign_is_consistent());
        assert!(sample("-1.00", TransactionType::Debit).is_debit());
        assert!(!sample("-1.00", TransactionType::Debit).is_credit());
    }

    #[test]
    fn test_bank_from_name() {
        assert_eq!(Bank::from_name("Sicoob"), Bank::Sicoob);
        assert_eq!(Bank::from_name("bb"), Bank::BancoDoBrasil);
        assert_eq!(Bank::from_name("Banco-do-Brasil"), Bank::BancoDoBrasil);
        assert_eq!(Bank::from_name("BANCO_DO_BRASIL"), Bank::BancoDoBrasil);
        assert_eq!(Bank::from_name("itau"), Bank::Unknown);
    }

    #[test]
    fn test_category_serializes_screaming_snake() {
        let json = serde_json::to_string(&Category::VendasPix).unwrap();
        assert_eq!(json, "\"VENDAS_PIX\"");
        assert_eq!(Category::Fornecedor.to_string(), "FORNECEDOR");
    }
}
