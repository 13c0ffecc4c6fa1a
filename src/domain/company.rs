use serde::{Deserialize, Serialize};

/// A payee that clients can pay.
///
/// Companies are never hard-deleted: payments keep referencing them by id, so
/// removal only clears the `active` flag.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub active: bool,
}

/// The mutable part of a company, as supplied on create and update.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFields {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "contacto")]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "telefono")]
    pub phone: Option<String>,
}

impl CompanyFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Company {
    pub fn new(id: u32, fields: CompanyFields) -> Self {
        let mut company = Self {
            id,
            name: String::new(),
            contact: String::new(),
            email: String::new(),
            phone: String::new(),
            active: true,
        };
        company.apply(fields);
        company
    }

    /// Replaces every mutable field. `id` and `active` are left untouched.
    pub fn apply(&mut self, fields: CompanyFields) {
        self.name = fields.name.trim().to_string();
        self.contact = fields.contact.unwrap_or_default();
        self.email = fields.email.unwrap_or_default();
        self.phone = fields.phone.unwrap_or_default();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

/// The catalog seeded into an empty directory.
pub fn default_catalog() -> Vec<CompanyFields> {
    [
        ("Edesur", "Servicio Eléctrico", "info@edesur.com.ar", "0800-333-7871"),
        ("Aysa", "Agua y Saneamientos", "contacto@aysa.com.ar", "0800-345-2972"),
        ("Telecom", "Telecomunicaciones", "atencion@telecom.com.ar", "0800-888-0123"),
        ("Metrogas", "Servicio de Gas", "clientes@metrogas.com.ar", "0800-555-4427"),
    ]
    .into_iter()
    .map(|(name, contact, email, phone)| CompanyFields {
        name: name.to_string(),
        contact: Some(contact.to_string()),
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
    })
    .collect()
}
