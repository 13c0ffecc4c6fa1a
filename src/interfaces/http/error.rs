use crate::error::PaymentError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::Validation { .. } | PaymentError::Conflict(_) => StatusCode::BAD_REQUEST,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            PaymentError::Validation { field, message } => {
                json!({ "error": message, "field": field })
            }
            err if err.is_server_side() => {
                // Store details stay in the log
                error!(error = %err, "Request failed");
                json!({ "error": "internal server error" })
            }
            err => json!({ "error": err.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for PaymentError {
    fn from(rejection: JsonRejection) -> Self {
        PaymentError::validation("body", rejection.body_text())
    }
}

impl From<PathRejection> for PaymentError {
    fn from(rejection: PathRejection) -> Self {
        PaymentError::validation("id", rejection.body_text())
    }
}
