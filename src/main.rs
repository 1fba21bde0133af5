use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use paydesk::application::engine::Engine;
use paydesk::domain::ports::{AccountStoreBox, AuditLogBox, PayoutStoreBox, SubmissionStoreBox};
use paydesk::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryAuditLog, InMemoryPayoutStore, InMemorySubmissionStore,
};
use paydesk::interfaces::csv::command_reader::CommandReader;
use paydesk::interfaces::csv::report_writer::ReportWriter;
use paydesk::interfaces::runner::ScriptRunner;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    Accounts,
    Submissions,
    Payouts,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command script CSV file
    input: PathBuf,

    /// Which report to write to stdout after the script has run
    #[arg(long, value_enum, default_value = "accounts")]
    report: Report,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = build_engine(&cli).into_diagnostic()?;
    let mut runner = ScriptRunner::new(engine);

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = runner.apply(command).await {
                    eprintln!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    match cli.report {
        Report::Accounts => {
            let rows = runner.accounts_report().await.into_diagnostic()?;
            writer.write_accounts(&rows).into_diagnostic()?;
        }
        Report::Submissions => {
            let rows = runner.submissions_report().await.into_diagnostic()?;
            writer.write_submissions(&rows).into_diagnostic()?;
        }
        Report::Payouts => {
            let rows = runner.payouts_report().await.into_diagnostic()?;
            writer.write_payouts(&rows).into_diagnostic()?;
        }
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn build_engine(cli: &Cli) -> paydesk::error::Result<Engine> {
    use paydesk::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = &cli.db_path {
        let store = RocksDBStore::open(db_path)?;
        let accounts: AccountStoreBox = Box::new(store.clone());
        let submissions: SubmissionStoreBox = Box::new(store.clone());
        let payouts: PayoutStoreBox = Box::new(store.clone());
        let audit: AuditLogBox = Box::new(store);
        Ok(Engine::new(accounts, submissions, payouts, audit))
    } else {
        Ok(in_memory_engine())
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn build_engine(cli: &Cli) -> paydesk::error::Result<Engine> {
    if cli.db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_engine())
}

fn in_memory_engine() -> Engine {
    let accounts: AccountStoreBox = Box::new(InMemoryAccountStore::new());
    let submissions: SubmissionStoreBox = Box::new(InMemorySubmissionStore::new());
    let payouts: PayoutStoreBox = Box::new(InMemoryPayoutStore::new());
    let audit: AuditLogBox = Box::new(InMemoryAuditLog::new());
    Engine::new(accounts, submissions, payouts, audit)
}
