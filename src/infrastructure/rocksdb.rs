use crate::domain::company::Company;
use crate::domain::payment::Payment;
use crate::domain::ports::{CompanyStore, PaymentStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing companies.
pub const CF_COMPANIES: &str = "companies";
/// Column Family for storing payments.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family indexing receipt numbers to payment ids.
pub const CF_RECEIPTS: &str = "receipts";

/// A persistent store implementation using RocksDB.
///
/// Companies and payments live in separate Column Families keyed by their
/// big-endian id, so iteration order is id order. Values are JSON.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_COMPANIES, CF_PAYMENTS, CF_RECEIPTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::Persistence(format!("column family {name} not found")))
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, id: u32, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, id.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, id: u32) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn all_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

#[async_trait]
impl CompanyStore for RocksDBStore {
    async fn store(&self, company: Company) -> Result<()> {
        self.put_json(CF_COMPANIES, company.id, &company)
    }

    async fn get(&self, id: u32) -> Result<Option<Company>> {
        self.get_json(CF_COMPANIES, id)
    }

    async fn get_all(&self) -> Result<Vec<Company>> {
        self.all_json(CF_COMPANIES)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let receipts = self.cf(CF_RECEIPTS)?;
        self.db.put_cf(
            receipts,
            payment.receipt_number.as_str().as_bytes(),
            payment.id.to_be_bytes(),
        )?;
        self.put_json(CF_PAYMENTS, payment.id, &payment)
    }

    async fn get(&self, id: u32) -> Result<Option<Payment>> {
        self.get_json(CF_PAYMENTS, id)
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        self.all_json(CF_PAYMENTS)
    }

    async fn max_id(&self) -> Result<Option<u32>> {
        let cf = self.cf(CF_PAYMENTS)?;
        let Some(item) = self.db.iterator_cf(cf, IteratorMode::End).next() else {
            return Ok(None);
        };
        let (key, _value) = item?;
        let bytes: [u8; 4] = key
            .as_ref()
            .try_into()
            .map_err(|_| PaymentError::Persistence("malformed payment key".to_string()))?;
        Ok(Some(u32::from_be_bytes(bytes)))
    }

    async fn receipt_exists(&self, receipt: &str) -> Result<bool> {
        let cf = self.cf(CF_RECEIPTS)?;
        // Just check if the key exists without retrieving the value
        Ok(self.db.get_pinned_cf(cf, receipt.as_bytes())?.is_some())
    }
}
