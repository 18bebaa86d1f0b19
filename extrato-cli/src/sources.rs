use anyhow::{Context, Result};
use extrato_core::Bank;
use extrato_ledger::StatementSource;
use std::path::Path;

/// Which grammar to use for a file: `--bank`, then the file name, then the
/// configured default.
pub fn bank_hint(flag: Option<&str>, path: &Path, default: Bank) -> Bank {
    if let Some(name) = flag {
        return Bank::from_name(name);
    }
    match bank_from_file_name(path) {
        Bank::Unknown => default,
        bank => bank,
    }
}

fn bank_from_file_name(path: &Path) -> Bank {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return Bank::Unknown;
    };
    let stem = stem.to_lowercase();
    let squashed: String = stem.chars().filter(|c| c.is_alphanumeric()).collect();

    if squashed.contains("sicoob") {
        Bank::Sicoob
    } else if squashed.contains("bancodobrasil")
        || stem.split(|c: char| !c.is_alphanumeric()).any(|t| t == "bb")
    {
        Bank::BancoDoBrasil
    } else {
        Bank::Unknown
    }
}

/// Read an already-extracted statement text file.
pub fn read_source(path: &Path, bank: Bank) -> Result<StatementSource> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(StatementSource::new(text, bank, name))
}
