use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use extrato_core::Transaction;
use extrato_ledger::{CsvLedgerStore, ImportReport, StatementImporter, TransactionStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod config;
mod sources;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "extrato", version, about = "Import Brazilian bank statements into a deduplicated ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import extracted statement text files (one statement per file)
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// sicoob | bb (default: guessed from the file name, then config)
        #[arg(long)]
        bank: Option<String>,

        /// Print the import reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print ledger transactions
    List {
        /// Only transactions from this statement
        #[arg(long)]
        statement: Option<Uuid>,
    },

    /// Remove every transaction of a statement
    Forget { statement_id: Uuid },

    /// Remove transactions dated before YYYY-MM-DD
    Purge {
        #[arg(long)]
        before: NaiveDate,
    },

    /// Manage ~/.extrato/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_logging(&cfg.logging.level);

    match cli.command {
        Command::Import { files, bank, json } => {
            import_files(&cfg, files, bank.as_deref(), json).await?;
        }

        Command::List { statement } => {
            let store = open_ledger(&cfg).await?;
            let txns = store.list().await?;
            let mut shown = 0;
            for t in txns.iter().filter(|t| statement.is_none_or(|id| t.statement_id == id)) {
                print_transaction(t);
                shown += 1;
            }
            println!("\n{shown} transactions in {}", store.path().display());
        }

        Command::Forget { statement_id } => {
            let store = open_ledger(&cfg).await?;
            let removed = store.delete_statement(statement_id).await?;
            if removed == 0 {
                bail!("no transactions for statement {statement_id}");
            }
            println!("Removed {removed} transactions of statement {statement_id}");
        }

        Command::Purge { before } => {
            let store = open_ledger(&cfg).await?;
            let removed = store.purge_before(before).await?;
            println!("Removed {removed} transactions dated before {before}");
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn init_logging(default_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn open_ledger(cfg: &Config) -> Result<CsvLedgerStore> {
    let path = cfg.ledger_path()?;
    CsvLedgerStore::open(&path)
        .await
        .with_context(|| format!("open ledger {}", path.display()))
}

/// Each file is its own statement and its own task; they share the ledger.
async fn import_files(cfg: &Config, files: Vec<PathBuf>, bank: Option<&str>, json: bool) -> Result<()> {
    let store = Arc::new(open_ledger(cfg).await?);
    let timezone = cfg.timezone()?;
    let total = files.len();

    let mut handles = Vec::with_capacity(total);
    for path in files {
        let hint = sources::bank_hint(bank, &path, cfg.default_bank());
        let source = sources::read_source(&path, hint)?;
        let importer = StatementImporter::new(Arc::clone(&store)).with_timezone(timezone);
        handles.push(tokio::spawn(async move {
            let result = importer.import(source).await;
            (path, result)
        }));
    }

    let mut reports = Vec::with_capacity(total);
    let mut failed = 0;
    for handle in handles {
        let (path, result) = handle.await.context("import task panicked")?;
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(file = %path.display(), error = %e, "import failed");
                eprintln!("{}: {e}", path.display());
                failed += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for r in &reports {
            print_report(r);
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} statements failed to import");
    }
    Ok(())
}

fn print_report(r: &ImportReport) {
    println!(
        "{} [{}] statement {}: {} parsed, {} new, {} duplicate, {} dropped",
        r.statement.source_name,
        r.statement.bank,
        r.statement.id,
        r.candidates,
        r.new_count(),
        r.duplicates + r.lost_races,
        r.dropped
    );
    for t in &r.inserted {
        print!("  ");
        print_transaction(t);
    }
}

fn print_transaction(t: &Transaction) {
    println!(
        "{} {:>12} {:<20} {:<8} {}",
        t.transaction_date,
        t.amount.to_string(),
        t.category.as_str(),
        t.document.as_deref().unwrap_or("-"),
        t.history
    );
}
