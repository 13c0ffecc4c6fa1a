//! Application layer orchestrating the domain.
//!
//! [`directory::CompanyDirectory`] and [`ledger::PaymentLedger`] serialize their
//! own writes; [`processor::PaymentProcessor`] runs the submission pipeline on
//! top of both. [`Services`] bundles them for the CLI and the HTTP surface.

pub mod directory;
pub mod ledger;
pub mod processor;
pub mod reports;
pub mod request;

use crate::domain::ports::{
    CompanyStoreBox, PaymentGatewayBox, PaymentStoreBox, SharedClock, SharedReportingSink,
};
use directory::CompanyDirectory;
use ledger::PaymentLedger;
use processor::{PaymentProcessor, ProcessorSettings};
use reports::PaymentReports;
use std::sync::Arc;

/// Shared handles to every service, cheap to clone.
#[derive(Clone)]
pub struct Services {
    pub directory: Arc<CompanyDirectory>,
    pub ledger: Arc<PaymentLedger>,
    pub processor: Arc<PaymentProcessor>,
}

impl Services {
    pub fn new(
        companies: CompanyStoreBox,
        payments: PaymentStoreBox,
        gateway: PaymentGatewayBox,
        clock: SharedClock,
        settings: ProcessorSettings,
        sink: Option<SharedReportingSink>,
    ) -> Self {
        let directory = Arc::new(CompanyDirectory::new(companies));
        let ledger = Arc::new(PaymentLedger::new(payments, Arc::clone(&clock)));
        let mut processor = PaymentProcessor::new(
            Arc::clone(&directory),
            Arc::clone(&ledger),
            gateway,
            clock,
            settings,
        );
        if let Some(sink) = sink {
            processor = processor.with_sink(sink);
        }
        Self {
            directory,
            ledger,
            processor: Arc::new(processor),
        }
    }

    pub fn reports(&self) -> PaymentReports<'_> {
        PaymentReports::new(&self.ledger, &self.directory)
    }
}
