use super::company::Company;
use super::payment::{Payment, PaymentDraft};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Record store for companies, keyed by id.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn store(&self, company: Company) -> Result<()>;
    async fn get(&self, id: u32) -> Result<Option<Company>>;
    async fn get_all(&self) -> Result<Vec<Company>>;
}

/// Record store for payments, keyed by id.
///
/// Stores hold records only. Identity assignment and its serialization live in
/// [`crate::application::ledger::PaymentLedger`].
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: u32) -> Result<Option<Payment>>;
    async fn get_all(&self) -> Result<Vec<Payment>>;
    /// Highest id stored so far, if any.
    async fn max_id(&self) -> Result<Option<u32>>;
    async fn receipt_exists(&self, receipt: &str) -> Result<bool>;
}

/// Best-effort replication target for completed payments.
#[async_trait]
pub trait ReportingSink: Send + Sync {
    async fn publish(&self, payment: &Payment, company_name: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayVerdict {
    Approved,
    Declined,
}

/// Authorizes a validated card payment.
pub trait PaymentGateway: Send + Sync {
    fn authorize(&self, draft: &PaymentDraft) -> GatewayVerdict;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type CompanyStoreBox = Box<dyn CompanyStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
/// Shared because publication runs on a spawned task.
pub type SharedReportingSink = Arc<dyn ReportingSink>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type SharedClock = Arc<dyn Clock>;
