//! Untyped payment submission as it arrives from a boundary (JSON body or CSV row).
//!
//! Nothing here is validated yet; [`crate::application::processor`] turns a
//! [`PaymentRequest`] into a draft or a field-specific validation error.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A scalar accepted either as text or as a number, kept as its text form.
///
/// JSON clients send `"amount": 500` as often as `"amount": "500"`, and CSV
/// readers infer numeric cells, so both spellings end up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LenientText(pub String);

impl LenientText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LenientText {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

struct LenientTextVisitor;

impl Visitor<'_> for LenientTextVisitor {
    type Value = LenientText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(LenientText(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(LenientText(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(LenientText(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(LenientText(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(LenientText(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(LenientText(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for LenientText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LenientTextVisitor)
    }
}

/// A payment submission. Which fields are required depends on the
/// processor's submission mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default, alias = "client_first_name", alias = "nombre_cliente")]
    pub client_first_name: Option<String>,
    #[serde(default, alias = "client_last_name", alias = "apellido_cliente")]
    pub client_last_name: Option<String>,
    #[serde(default, alias = "company_id", alias = "empresa_id")]
    pub company_id: Option<LenientText>,
    #[serde(default, alias = "importe")]
    pub amount: Option<LenientText>,
    #[serde(default, alias = "payment_method", alias = "metodo_pago")]
    pub payment_method: Option<String>,
    #[serde(default, alias = "card_number")]
    pub card_number: Option<String>,
    #[serde(default)]
    pub cvv: Option<String>,
    #[serde(default, alias = "expiry", alias = "expiry_date")]
    pub expiry_date: Option<String>,
}

/// Returns the trimmed value, or `None` when absent or blank.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_numbers_and_strings_are_both_accepted() {
        let numeric: PaymentRequest =
            serde_json::from_str(r#"{"companyId": 1, "amount": 500.5}"#).unwrap();
        assert_eq!(numeric.company_id, Some(LenientText::from("1")));
        assert_eq!(numeric.amount, Some(LenientText::from("500.5")));

        let textual: PaymentRequest =
            serde_json::from_str(r#"{"companyId": "1", "amount": "500.50"}"#).unwrap();
        assert_eq!(textual.amount, Some(LenientText::from("500.50")));
    }

    #[test]
    fn test_null_and_missing_fields_are_none() {
        let request: PaymentRequest =
            serde_json::from_str(r#"{"clientFirstName": null}"#).unwrap();
        assert!(request.client_first_name.is_none());
        assert!(request.amount.is_none());
    }

    #[test]
    fn test_spanish_field_names() {
        let request: PaymentRequest = serde_json::from_str(
            r#"{"nombre_cliente":"Ana","apellido_cliente":"Lopez","empresa_id":"2","importe":"150","metodo_pago":"Visa"}"#,
        )
        .unwrap();
        assert_eq!(request.client_first_name.as_deref(), Some("Ana"));
        assert_eq!(request.company_id, Some(LenientText::from("2")));
        assert_eq!(request.payment_method.as_deref(), Some("Visa"));
    }

    #[test]
    fn test_csv_row_keeps_card_digits_as_text() {
        let data = "client_first_name,client_last_name,company_id,amount,card_number,cvv,expiry\n\
                    Ana,Lopez,1,500.00,4532015112830366,012,12/30";
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        let request: PaymentRequest = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(request.card_number.as_deref(), Some("4532015112830366"));
        assert_eq!(request.cvv.as_deref(), Some("012"));
        assert_eq!(request.expiry_date.as_deref(), Some("12/30"));
        assert_eq!(request.company_id, Some(LenientText::from("1")));
        assert!(request.payment_method.is_none());
    }

    #[test]
    fn test_present_trims_and_drops_blank() {
        assert_eq!(present(Some("  Ana ")), Some("Ana"));
        assert_eq!(present(Some("   ")), None);
        assert_eq!(present(None), None);
    }
}
