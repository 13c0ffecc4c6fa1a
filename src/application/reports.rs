use super::directory::CompanyDirectory;
use super::ledger::PaymentLedger;
use crate::domain::payment::{Payment, PaymentFilter, PaymentSort, PaymentStats};
use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;

/// Shown when a payment references a company the directory does not know.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// A payment joined with its company's current name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    pub company_name: String,
}

/// Read side over the ledger and the directory.
///
/// Names are resolved at read time, so a renamed company shows its new name
/// on old payments, and deactivated companies still resolve.
pub struct PaymentReports<'a> {
    ledger: &'a PaymentLedger,
    directory: &'a CompanyDirectory,
}

impl<'a> PaymentReports<'a> {
    pub fn new(ledger: &'a PaymentLedger, directory: &'a CompanyDirectory) -> Self {
        Self { ledger, directory }
    }

    pub async fn list(&self, filter: &PaymentFilter) -> Result<Vec<PaymentView>> {
        let payments = self.ledger.query(filter, PaymentSort::NewestFirst).await?;
        let names = self.company_names().await?;
        Ok(payments
            .into_iter()
            .map(|payment| join(payment, &names))
            .collect())
    }

    pub async fn get(&self, id: u32) -> Result<PaymentView> {
        let payment = self.ledger.get(id).await?;
        let names = self.company_names().await?;
        Ok(join(payment, &names))
    }

    pub async fn stats(&self, filter: &PaymentFilter) -> Result<PaymentStats> {
        self.ledger.aggregate(filter).await
    }

    async fn company_names(&self) -> Result<HashMap<u32, String>> {
        Ok(self
            .directory
            .list(false)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }
}

fn join(payment: Payment, names: &HashMap<u32, String>) -> PaymentView {
    let company_name = names
        .get(&payment.company_id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
    PaymentView {
        payment,
        company_name,
    }
}
