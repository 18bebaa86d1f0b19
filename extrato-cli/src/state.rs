use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// `$EXTRATO_HOME`, or `~/.extrato` when unset.
pub fn extrato_home() -> Result<PathBuf> {
    resolve_home(std::env::var_os("EXTRATO_HOME"), std::env::var_os("HOME"))
}

fn resolve_home(override_dir: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = home.context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".extrato"))
}

pub fn ensure_extrato_home() -> Result<PathBuf> {
    let dir = extrato_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_ledger_path() -> Result<PathBuf> {
    Ok(extrato_home()?.join("ledger.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = resolve_home(Some("/srv/extrato".into()), Some("/home/ana".into())).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/extrato"));
    }

    #[test]
    fn test_falls_back_to_home() {
        let dir = resolve_home(Some("".into()), Some("/home/ana".into())).unwrap();
        assert_eq!(dir, PathBuf::from("/home/ana/.extrato"));
    }

    #[test]
    fn test_no_home_is_an_error() {
        assert!(resolve_home(None, None).is_err());
    }
}
