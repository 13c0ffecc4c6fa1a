//! Command line and environment configuration.

use crate::application::processor::{AmountPolicy, ProcessorSettings, SubmissionMode};
use crate::domain::payment::{PaymentFilter, PaymentMethod};
use crate::error::{PaymentError, Result};
use crate::infrastructure::gateway::DEFAULT_APPROVAL_RATE;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "PAYDESK_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// How card data in submissions is trusted
    #[arg(long, global = true, env = "PAYDESK_MODE", value_enum, default_value_t = ModeArg::Declared)]
    pub mode: ModeArg,

    /// Smallest accepted amount
    #[arg(long, global = true, default_value = "100")]
    pub min_amount: Decimal,

    /// Largest accepted amount
    #[arg(long, global = true, default_value = "100000")]
    pub max_amount: Decimal,

    /// Accept any positive amount
    #[arg(long, global = true)]
    pub unbounded_amount: bool,

    /// Probability in [0, 1] that the simulated gateway approves a card payment
    #[arg(long, global = true, default_value_t = DEFAULT_APPROVAL_RATE)]
    pub approval_rate: f64,

    /// Append every recorded payment to this CSV file
    #[arg(long, global = true, env = "PAYDESK_REPLICA_CSV")]
    pub replica_csv: Option<PathBuf>,

    /// Do not seed the default company catalog into an empty store
    #[arg(long, global = true)]
    pub no_seed: bool,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, env = "PAYDESK_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the REST API
    Serve {
        #[arg(long, env = "PAYDESK_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
    /// Submit every row of a payments CSV file and print the recorded payments
    Process {
        /// Input payments CSV file
        input: PathBuf,
    },
    /// Print the ledger as CSV, newest first
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    #[arg(long)]
    pub company_id: Option<u32>,

    /// Inclusive, YYYY-MM-DD
    #[arg(long)]
    pub date_from: Option<NaiveDate>,

    /// Inclusive, YYYY-MM-DD
    #[arg(long)]
    pub date_to: Option<NaiveDate>,

    #[arg(long)]
    pub method: Option<PaymentMethod>,
}

impl From<&ExportArgs> for PaymentFilter {
    fn from(args: &ExportArgs) -> Self {
        PaymentFilter {
            company_id: args.company_id,
            date_from: args.date_from,
            date_to: args.date_to,
            method: args.method,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// The caller names the card brand
    Declared,
    /// The brand is derived from the card number and a gateway decides
    Derived,
}

impl From<ModeArg> for SubmissionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Declared => SubmissionMode::DeclaredBrand,
            ModeArg::Derived => SubmissionMode::DerivedBrand,
        }
    }
}

/// Validated settings derived from [`GlobalOptions`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub processor: ProcessorSettings,
    pub approval_rate: f64,
    pub replica_csv: Option<PathBuf>,
    pub seed: bool,
}

impl AppConfig {
    pub fn from_options(options: &GlobalOptions) -> Result<Self> {
        let amounts = if options.unbounded_amount {
            AmountPolicy::unbounded()
        } else {
            if options.min_amount > options.max_amount {
                return Err(PaymentError::validation(
                    "minAmount",
                    format!(
                        "--min-amount ({}) must not exceed --max-amount ({})",
                        options.min_amount, options.max_amount
                    ),
                ));
            }
            AmountPolicy {
                min: Some(options.min_amount),
                max: Some(options.max_amount),
            }
        };

        if !(0.0..=1.0).contains(&options.approval_rate) {
            return Err(PaymentError::validation(
                "approvalRate",
                format!(
                    "--approval-rate must be within [0, 1], got {}",
                    options.approval_rate
                ),
            ));
        }

        Ok(Self {
            db_path: options.db_path.clone(),
            processor: ProcessorSettings {
                mode: options.mode.into(),
                amounts,
            },
            approval_rate: options.approval_rate,
            replica_csv: options.replica_csv.clone(),
            seed: !options.no_seed,
        })
    }
}
