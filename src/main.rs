use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paydesk::application::Services;
use paydesk::config::{AppConfig, Cli, Command, ExportArgs};
use paydesk::domain::payment::PaymentFilter;
use paydesk::domain::ports::{
    CompanyStoreBox, PaymentStoreBox, SharedClock, SharedReportingSink,
};
use paydesk::infrastructure::clock::SystemClock;
use paydesk::infrastructure::gateway::SimulatedGateway;
use paydesk::infrastructure::in_memory::{InMemoryCompanyStore, InMemoryPaymentStore};
use paydesk::infrastructure::replica::CsvReplicaSink;
use paydesk::interfaces::csv::payment_reader::PaymentReader;
use paydesk::interfaces::csv::payment_writer::PaymentWriter;
use paydesk::interfaces::http;
use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.options.log_level);

    let config = AppConfig::from_options(&cli.options)?;
    let services = build_services(&config)?;

    if config.seed {
        services.directory.seed_defaults().await?;
    }

    match cli.command {
        Command::Serve { bind } => serve(services, bind).await,
        Command::Process { input } => process(&services, &input).await,
        Command::Export(args) => export(&services, &args).await,
    }
}

/// Logs go to stderr so stdout stays clean for CSV output.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_stores(db_path: Option<&PathBuf>) -> Result<(CompanyStoreBox, PaymentStoreBox)> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            use paydesk::infrastructure::rocksdb::RocksDBStore;

            let store = RocksDBStore::open(path)?;
            info!(path = %path.display(), "Using RocksDB storage");
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(in_memory_stores())
        }
        None => {
            info!("Using in-memory storage");
            Ok(in_memory_stores())
        }
    }
}

fn in_memory_stores() -> (CompanyStoreBox, PaymentStoreBox) {
    (
        Box::new(InMemoryCompanyStore::new()),
        Box::new(InMemoryPaymentStore::new()),
    )
}

fn build_services(config: &AppConfig) -> Result<Services> {
    let (companies, payments) = open_stores(config.db_path.as_ref())?;
    let gateway = SimulatedGateway::new(config.approval_rate)?;
    let clock: SharedClock = Arc::new(SystemClock);
    let sink = config.replica_csv.as_ref().map(|path| {
        info!(path = %path.display(), "Replicating payments to CSV");
        Arc::new(CsvReplicaSink::new(path)) as SharedReportingSink
    });

    Ok(Services::new(
        companies,
        payments,
        Box::new(gateway),
        clock,
        config.processor,
        sink,
    ))
}

async fn serve(services: Services, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .into_diagnostic()?;
    info!(%bind, mode = ?services.processor.settings().mode, "Starting payment server");
    http::serve(listener, services).await?;
    Ok(())
}

async fn process(services: &Services, input: &Path) -> Result<()> {
    let file = File::open(input).into_diagnostic()?;
    let reader = PaymentReader::new(file);

    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock())?;

    for request in reader.requests() {
        match request {
            Ok(request) => match services.processor.submit(request).await {
                Ok(outcome) => writer.write(&outcome.into_view())?,
                Err(e) => eprintln!("Error processing payment: {}", e),
            },
            Err(e) => eprintln!("Error reading payment request: {}", e),
        }
    }
    writer.flush()?;
    services.processor.drain_replication().await;

    Ok(())
}

async fn export(services: &Services, args: &ExportArgs) -> Result<()> {
    let views = services.reports().list(&PaymentFilter::from(args)).await?;

    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock())?;
    writer.write_all(&views)?;

    Ok(())
}
