use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum PaymentError {
    /// Bad or missing input. Never persisted.
    #[error("{message}")]
    #[diagnostic(code(paydesk::validation))]
    Validation { field: &'static str, message: String },

    #[error("{0} not found")]
    #[diagnostic(code(paydesk::not_found))]
    NotFound(String),

    #[error("{0}")]
    #[diagnostic(code(paydesk::conflict))]
    Conflict(String),

    #[error("persistence error: {0}")]
    #[diagnostic(code(paydesk::persistence))]
    Persistence(String),

    /// An aggregate left the range of the decimal type.
    #[error("arithmetic overflow: {0}")]
    #[diagnostic(code(paydesk::overflow))]
    Overflow(String),

    /// The external reporting sink failed. Only ever logged.
    #[error("upstream sync error: {0}")]
    #[diagnostic(code(paydesk::upstream_sync))]
    UpstreamSync(String),

    #[error("CSV error: {0}")]
    #[diagnostic(code(paydesk::csv))]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(paydesk::io))]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    #[diagnostic(code(paydesk::serialization))]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    #[diagnostic(code(paydesk::rocksdb))]
    RocksDbError(#[from] rocksdb::Error),
}

impl PaymentError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// True for failures of the backing store rather than of the caller's input.
    pub fn is_server_side(&self) -> bool {
        !matches!(
            self,
            Self::Validation { .. } | Self::NotFound(_) | Self::Conflict(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_displayed_verbatim() {
        let err = PaymentError::validation("amount", "amount must be a positive number");
        assert_eq!(err.to_string(), "amount must be a positive number");
        assert!(!err.is_server_side());
    }

    #[test]
    fn test_store_failures_are_server_side() {
        let err = PaymentError::from(std::io::Error::other("disk gone"));
        assert!(err.is_server_side());
        assert!(PaymentError::Persistence("x".into()).is_server_side());
        assert!(!PaymentError::NotFound("company 3".into()).is_server_side());
    }
}
