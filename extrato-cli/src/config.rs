use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use extrato_core::Bank;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{default_ledger_path, ensure_extrato_home, extrato_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub import: ImportSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    /// IANA name; supplies the year for `dd/MM` dates
    pub timezone: String,
    /// Defaults to `<home>/ledger.csv`
    pub ledger_path: Option<PathBuf>,
    /// Used when neither `--bank` nor the file name says which bank it is
    pub default_bank: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            timezone: "America/Sao_Paulo".to_string(),
            ledger_path: None,
            default_bank: None,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        self.import
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid timezone {:?} in config: {e}", self.import.timezone))
    }

    pub fn ledger_path(&self) -> Result<PathBuf> {
        match &self.import.ledger_path {
            Some(p) => Ok(p.clone()),
            None => default_ledger_path(),
        }
    }

    pub fn default_bank(&self) -> Bank {
        self.import
            .default_bank
            .as_deref()
            .map_or(Bank::Unknown, Bank::from_name)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(extrato_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_extrato_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
