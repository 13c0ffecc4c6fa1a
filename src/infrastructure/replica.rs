use crate::domain::payment::Payment;
use crate::domain::ports::ReportingSink;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const HEADER: [&str; 8] = [
    "id",
    "client_first_name",
    "client_last_name",
    "company",
    "amount",
    "payment_method",
    "receipt_number",
    "timestamp",
];

/// Appends every published payment as a row of a CSV file.
///
/// The header is written when the file is created or empty. Appends are
/// serialized so rows never interleave, and run on the blocking pool.
pub struct CsvReplicaSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvReplicaSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportingSink for CsvReplicaSink {
    async fn publish(&self, payment: &Payment, company_name: &str) -> Result<()> {
        let row = [
            payment.id.to_string(),
            payment.client_first_name.clone(),
            payment.client_last_name.clone(),
            company_name.to_string(),
            format!("{:.2}", payment.amount.value()),
            payment.payment_method.to_string(),
            payment.receipt_number.to_string(),
            payment.timestamp.to_rfc3339(),
        ];
        let path = self.path.clone();

        let _guard = self.write_lock.lock().await;
        tokio::task::spawn_blocking(move || append_row(&path, &row))
            .await
            .map_err(|e| PaymentError::UpstreamSync(format!("replica writer failed: {e}")))?
    }
}

fn append_row(path: &Path, row: &[String]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PaymentError::UpstreamSync(format!("cannot open {}: {e}", path.display())))?;
    let is_empty = file.metadata().map(|m| m.len() == 0).unwrap_or(true);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if is_empty {
        writer.write_record(HEADER)?;
    }
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}
