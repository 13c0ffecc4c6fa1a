#![allow(dead_code)]

use paydesk::application::Services;
use paydesk::application::processor::{ProcessorSettings, SubmissionMode};
use paydesk::domain::ports::{GatewayVerdict, SharedClock};
use paydesk::infrastructure::clock::SystemClock;
use paydesk::infrastructure::gateway::FixedGateway;
use paydesk::infrastructure::in_memory::{InMemoryCompanyStore, InMemoryPaymentStore};
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

/// In-memory services with a gateway that always gives `verdict`.
pub fn services(mode: SubmissionMode, verdict: GatewayVerdict) -> Services {
    let clock: SharedClock = Arc::new(SystemClock);
    Services::new(
        Box::new(InMemoryCompanyStore::new()),
        Box::new(InMemoryPaymentStore::new()),
        Box::new(FixedGateway(verdict)),
        clock,
        ProcessorSettings {
            mode,
            ..Default::default()
        },
        None,
    )
}

/// Writes `rows` valid declared-brand submissions against company 1.
pub fn generate_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record([
        "clientFirstName",
        "clientLastName",
        "companyId",
        "amount",
        "paymentMethod",
    ])?;

    for i in 1..=rows {
        let amount = format!("{}.50", 100 + i);
        wtr.write_record(["Ana", "Lopez", "1", amount.as_str(), "Visa"])?;
    }

    wtr.flush()?;
    Ok(())
}
