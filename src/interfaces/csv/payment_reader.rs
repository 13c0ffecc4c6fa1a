use crate::application::request::PaymentRequest;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads payment submissions from a CSV source.
///
/// Columns are matched by header name (camelCase, snake_case or the Spanish
/// aliases). Unknown columns are ignored, missing ones are left empty for the
/// processor to report.
pub struct PaymentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes one request per row.
    pub fn requests(self) -> impl Iterator<Item = Result<PaymentRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "clientFirstName, clientLastName, companyId, amount, paymentMethod\n\
                    Ana, Lopez, 1, 500, Visa\n\
                    Juan, Perez, 2, 1250.75, Mastercard";
        let reader = PaymentReader::new(data.as_bytes());
        let results: Vec<Result<PaymentRequest>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.client_first_name.as_deref(), Some("Ana"));
        assert_eq!(first.payment_method.as_deref(), Some("Visa"));
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.amount.as_ref().map(|a| a.as_str()), Some("1250.75"));
    }

    #[test]
    fn test_reader_short_row_leaves_fields_empty() {
        let data = "clientFirstName,clientLastName,companyId,amount,paymentMethod\nAna,Lopez";
        let reader = PaymentReader::new(data.as_bytes());
        let results: Vec<Result<PaymentRequest>> = reader.requests().collect();

        let request = results[0].as_ref().unwrap();
        assert_eq!(request.client_last_name.as_deref(), Some("Lopez"));
        assert!(request.company_id.is_none());
        assert!(request.payment_method.is_none());
    }

    #[test]
    fn test_reader_malformed_utf8() {
        let mut data = b"clientFirstName,clientLastName\n".to_vec();
        data.extend_from_slice(&[0xff, 0xfe, b',', b'x', b'\n']);
        let reader = PaymentReader::new(data.as_slice());
        let results: Vec<Result<PaymentRequest>> = reader.requests().collect();

        assert!(results[0].is_err());
    }
}
