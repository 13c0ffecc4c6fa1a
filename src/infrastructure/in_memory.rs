use crate::domain::company::Company;
use crate::domain::payment::Payment;
use crate::domain::ports::{CompanyStore, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for companies.
///
/// Uses `Arc<RwLock<BTreeMap<u32, Company>>>` so clones share the same data
/// and listings come back in id order.
#[derive(Default, Clone)]
pub struct InMemoryCompanyStore {
    companies: Arc<RwLock<BTreeMap<u32, Company>>>,
}

impl InMemoryCompanyStore {
    /// Creates a new, empty in-memory company store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyStore for InMemoryCompanyStore {
    async fn store(&self, company: Company) -> Result<()> {
        let mut companies = self.companies.write().await;
        companies.insert(company.id, company);
        Ok(())
    }

    async fn get(&self, id: u32) -> Result<Option<Company>> {
        let companies = self.companies.read().await;
        Ok(companies.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Company>> {
        let companies = self.companies.read().await;
        Ok(companies.values().cloned().collect())
    }
}

#[derive(Default)]
struct PaymentTable {
    rows: BTreeMap<u32, Payment>,
    receipts: HashSet<String>,
}

/// A thread-safe in-memory store for payments.
///
/// Keeps a receipt index next to the rows so duplicate checks don't scan.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    table: Arc<RwLock<PaymentTable>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut table = self.table.write().await;
        table
            .receipts
            .insert(payment.receipt_number.as_str().to_string());
        table.rows.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, id: u32) -> Result<Option<Payment>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn max_id(&self) -> Result<Option<u32>> {
        let table = self.table.read().await;
        Ok(table.rows.keys().next_back().copied())
    }

    async fn receipt_exists(&self, receipt: &str) -> Result<bool> {
        let table = self.table.read().await;
        Ok(table.receipts.contains(receipt))
    }
}
