use crate::domain::company::{Company, CompanyFields, default_catalog};
use crate::domain::ports::CompanyStoreBox;
use crate::error::{PaymentError, Result};
use tokio::sync::Mutex;
use tracing::info;

/// Catalog of payee companies.
///
/// Mutations (create, update, deactivate) run one at a time so that id
/// assignment and the active-name uniqueness check see a stable catalog.
/// Reads go straight to the store.
pub struct CompanyDirectory {
    store: CompanyStoreBox,
    write_lock: Mutex<()>,
}

impl CompanyDirectory {
    pub fn new(store: CompanyStoreBox) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Seeds the default catalog when the store holds no company at all.
    ///
    /// Returns the number of companies created.
    pub async fn seed_defaults(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        if !self.store.get_all().await?.is_empty() {
            return Ok(0);
        }

        let catalog = default_catalog();
        let seeded = catalog.len();
        for (index, fields) in catalog.into_iter().enumerate() {
            let id = u32::try_from(index + 1)
                .map_err(|_| PaymentError::Persistence("catalog too large".to_string()))?;
            self.store.store(Company::new(id, fields)).await?;
        }
        info!(count = seeded, "Seeded default company catalog");
        Ok(seeded)
    }

    /// All companies, optionally only active ones, sorted by name
    /// (case-insensitive, ties by id).
    pub async fn list(&self, active_only: bool) -> Result<Vec<Company>> {
        let mut companies = self.store.get_all().await?;
        if active_only {
            companies.retain(|c| c.active);
        }
        companies.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(companies)
    }

    /// Looks a company up by id, active or not.
    pub async fn get_by_id(&self, id: u32) -> Result<Company> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(format!("company {id}")))
    }

    pub async fn create(&self, fields: CompanyFields) -> Result<Company> {
        validate_name(&fields)?;

        let _guard = self.write_lock.lock().await;
        let existing = self.store.get_all().await?;
        ensure_name_available(&existing, fields.name.trim(), None)?;

        let id = next_id(&existing)?;
        let company = Company::new(id, fields);
        self.store.store(company.clone()).await?;

        info!(id = company.id, name = %company.name, "Company created");
        Ok(company)
    }

    /// Replaces every mutable field of an existing company.
    pub async fn update(&self, id: u32, fields: CompanyFields) -> Result<Company> {
        validate_name(&fields)?;

        let _guard = self.write_lock.lock().await;
        let existing = self.store.get_all().await?;
        let mut company = existing
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| PaymentError::NotFound(format!("company {id}")))?;
        ensure_name_available(&existing, fields.name.trim(), Some(id))?;

        company.apply(fields);
        self.store.store(company.clone()).await?;

        info!(id, name = %company.name, "Company updated");
        Ok(company)
    }

    /// Soft-deletes a company. Deactivating an inactive company succeeds again.
    pub async fn deactivate(&self, id: u32) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut company = self.get_by_id(id).await?;
        company.deactivate();
        self.store.store(company).await?;

        info!(id, "Company deactivated");
        Ok(())
    }
}

fn validate_name(fields: &CompanyFields) -> Result<()> {
    if fields.name.trim().is_empty() {
        return Err(PaymentError::validation("name", "company name is required"));
    }
    Ok(())
}

fn ensure_name_available(existing: &[Company], name: &str, except: Option<u32>) -> Result<()> {
    let taken = existing
        .iter()
        .any(|c| c.active && c.name == name && Some(c.id) != except);
    if taken {
        return Err(PaymentError::Conflict(format!(
            "a company named '{name}' already exists"
        )));
    }
    Ok(())
}

fn next_id(existing: &[Company]) -> Result<u32> {
    match existing.iter().map(|c| c.id).max() {
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| PaymentError::Persistence("company id space exhausted".to_string())),
        None => Ok(1),
    }
}
