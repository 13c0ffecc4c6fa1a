use crate::domain::payment::{
    Payment, PaymentDraft, PaymentFilter, PaymentSort, PaymentStats, ReceiptNumber,
};
use crate::domain::ports::{PaymentStoreBox, SharedClock};
use crate::error::{PaymentError, Result};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Append-only record of submitted payments.
///
/// `append` is the single writer path: the id, receipt number and timestamp
/// are produced and the record stored inside one critical section, so
/// concurrent appends never share an id or receipt. Reads do not take the
/// lock.
pub struct PaymentLedger {
    store: PaymentStoreBox,
    clock: SharedClock,
    /// Next id to hand out, loaded from the store on first append.
    next_id: Mutex<Option<u32>>,
}

impl PaymentLedger {
    pub fn new(store: PaymentStoreBox, clock: SharedClock) -> Self {
        Self {
            store,
            clock,
            next_id: Mutex::new(None),
        }
    }

    /// Assigns identity to a draft, stamps the creation time and stores it.
    pub async fn append(&self, draft: PaymentDraft) -> Result<Payment> {
        let mut next_id = self.next_id.lock().await;
        let mut id = match *next_id {
            Some(id) => id,
            None => match self.store.max_id().await? {
                Some(max) => max.checked_add(1).ok_or_else(exhausted)?,
                None => 1,
            },
        };

        let timestamp = self.clock.now();
        let mut receipt_number = ReceiptNumber::generate(id, timestamp);
        // Records imported from elsewhere may already hold the receipt.
        while self.store.receipt_exists(receipt_number.as_str()).await? {
            warn!(receipt = %receipt_number, "Receipt number already issued, skipping id {id}");
            id = id.checked_add(1).ok_or_else(exhausted)?;
            receipt_number = ReceiptNumber::generate(id, timestamp);
        }

        let payment = Payment::from_draft(id, receipt_number, timestamp, draft);
        self.store.store(payment.clone()).await?;
        *next_id = Some(id.checked_add(1).ok_or_else(exhausted)?);

        info!(
            id = payment.id,
            receipt = %payment.receipt_number,
            status = %payment.status,
            "Payment recorded"
        );
        Ok(payment)
    }

    pub async fn get(&self, id: u32) -> Result<Payment> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(format!("payment {id}")))
    }

    /// Payments matching `filter`, in the requested order.
    pub async fn query(&self, filter: &PaymentFilter, sort: PaymentSort) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        sort.apply(&mut payments);
        Ok(payments)
    }

    pub async fn aggregate(&self, filter: &PaymentFilter) -> Result<PaymentStats> {
        let payments = self.query(filter, PaymentSort::Insertion).await?;
        PaymentStats::from_payments(&payments)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.store.get_all().await?.len())
    }
}

fn exhausted() -> PaymentError {
    PaymentError::Persistence("payment id space exhausted".to_string())
}
