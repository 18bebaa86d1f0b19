//! Deterministic keyword categorizer for statement descriptions.
//!
//! The table is scanned top to bottom and the first keyword found anywhere in
//! the lower-cased description wins. A description containing two keywords
//! resolves to whichever sits higher in [`KEYWORD_TABLE`], not to the one that
//! appears first in the text. Existing ledgers were classified this way, so
//! reordering the table changes historical results.

use crate::transaction::{Category, TransactionType};

/// Ordered `(keyword, category)` pairs. Keywords are lower-case.
pub const KEYWORD_TABLE: &[(&str, Category)] = &[
    // Fees come first so "TARIFA PIX" is never read as a sale
    ("tarifa", Category::TarifasBancarias),
    ("cesta de servicos", Category::TarifasBancarias),
    ("cesta de serviços", Category::TarifasBancarias),
    ("anuidade", Category::TarifasBancarias),
    // Investments
    ("rende facil", Category::AplicacaoFinanceira),
    ("rende fácil", Category::AplicacaoFinanceira),
    ("aplicacao", Category::AplicacaoFinanceira),
    ("aplicação", Category::AplicacaoFinanceira),
    ("resgate", Category::AplicacaoFinanceira),
    ("poupanca", Category::AplicacaoFinanceira),
    ("poupança", Category::AplicacaoFinanceira),
    // Taxes. "imposto" must stay above "posto"
    ("imposto", Category::Impostos),
    ("simples nacional", Category::Impostos),
    ("darf", Category::Impostos),
    ("receita federal", Category::Impostos),
    ("sefaz", Category::Impostos),
    ("iptu", Category::Impostos),
    ("inss", Category::Impostos),
    ("iof", Category::Impostos),
    // People
    ("pro labore", Category::ProLabore),
    ("pro-labore", Category::ProLabore),
    ("pró-labore", Category::ProLabore),
    ("salario", Category::FolhaPagamento),
    ("salário", Category::FolhaPagamento),
    ("folha", Category::FolhaPagamento),
    ("fgts", Category::FolhaPagamento),
    // Fixed costs
    ("aluguel", Category::Aluguel),
    ("energia", Category::Energia),
    ("cemig", Category::Energia),
    ("copel", Category::Energia),
    ("celesc", Category::Energia),
    ("equatorial", Category::Energia),
    ("saneamento", Category::AguaSaneamento),
    ("sabesp", Category::AguaSaneamento),
    ("copasa", Category::AguaSaneamento),
    ("sanepar", Category::AguaSaneamento),
    ("telefonica", Category::TelefoneInternet),
    ("telecom", Category::TelefoneInternet),
    ("vivo", Category::TelefoneInternet),
    ("oi fibra", Category::TelefoneInternet),
    ("posto", Category::Combustivel),
    ("combustivel", Category::Combustivel),
    ("combustível", Category::Combustivel),
    ("ipiranga", Category::Combustivel),
    // Credit
    ("emprestimo", Category::Emprestimos),
    ("empréstimo", Category::Emprestimos),
    ("financiamento", Category::Emprestimos),
    ("bndes", Category::Emprestimos),
    // Card acquirers
    ("cielo", Category::VendasCartao),
    ("redecard", Category::VendasCartao),
    ("getnet", Category::VendasCartao),
    ("stone", Category::VendasCartao),
    ("pagseguro", Category::VendasCartao),
    ("sumup", Category::VendasCartao),
    // Pix sales
    ("pix recebido", Category::VendasPix),
    ("pix receb", Category::VendasPix),
    ("cred pix", Category::VendasPix),
    ("recebimento pix", Category::VendasPix),
    // Suppliers
    ("boleto", Category::Fornecedor),
    ("pagamento de titulo", Category::Fornecedor),
    ("pag titulo", Category::Fornecedor),
    ("compra", Category::Fornecedor),
    // Transfers
    ("transf", Category::Transferencias),
];

/// First keyword hit in table order, if any.
pub fn match_keyword(description: &str) -> Option<Category> {
    let desc = description.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(keyword, _)| desc.contains(keyword))
        .map(|(_, category)| *category)
}

/// Categorize a description, falling back on the movement direction:
/// debits are supplier payments, credits are Pix sales.
pub fn classify(description: &str, kind: TransactionType) -> Category {
    match_keyword(description).unwrap_or(match kind {
        TransactionType::Debit => Category::Fornecedor,
        TransactionType::Credit => Category::VendasPix,
    })
}
