use clap::Parser;
use miette::{IntoDiagnostic, Result};
use promoledger::application::orchestrator::Orchestrator;
use promoledger::config::EngineConfig;
use promoledger::domain::account::AccountId;
use promoledger::domain::ports::Stores;
use promoledger::infrastructure::in_memory::MemoryStore;
use promoledger::infrastructure::membership::StaticMembership;
use promoledger::infrastructure::notify::LogNotifier;
#[cfg(feature = "storage-rocksdb")]
use promoledger::infrastructure::rocksdb::RocksDbStore;
use promoledger::interfaces::csv::account_writer::AccountWriter;
use promoledger::interfaces::csv::command_reader::CommandReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// Administrator account id
    #[arg(long, default_value_t = 1)]
    admin_id: AccountId,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean CSV stream.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let stores = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => Stores::from_backend(RocksDbStore::open(db_path).into_diagnostic()?),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            return Err(miette::miette!(
                "this binary was built without the storage-rocksdb feature"
            ));
        }
        None => Stores::from_backend(MemoryStore::new()),
    };

    let orchestrator = Orchestrator::new(
        stores.clone(),
        Arc::new(LogNotifier),
        Arc::new(StaticMembership::allow_all()),
        EngineConfig {
            admin_id: cli.admin_id,
            ..EngineConfig::default()
        },
    );

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for entry in reader.commands() {
        match entry {
            Ok((actor, command)) => {
                if let Err(e) = orchestrator.handle(actor, command).await {
                    eprintln!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    let accounts = stores.accounts.all().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    Ok(())
}
