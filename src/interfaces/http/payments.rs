use crate::application::Services;
use crate::application::reports::PaymentView;
use crate::application::request::{PaymentRequest, present};
use crate::domain::payment::{PaymentFilter, PaymentMethod, PaymentStats};
use crate::error::{PaymentError, Result};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};

/// Query string of the listing and stats endpoints. Blank values are ignored,
/// as browsers send empty form fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    #[serde(default, alias = "empresa_id")]
    pub company_id: Option<String>,
    #[serde(default, alias = "fecha_desde")]
    pub date_from: Option<String>,
    #[serde(default, alias = "fecha_hasta")]
    pub date_to: Option<String>,
    #[serde(default, alias = "metodo_pago")]
    pub method: Option<String>,
}

impl TryFrom<PaymentQuery> for PaymentFilter {
    type Error = PaymentError;

    fn try_from(query: PaymentQuery) -> Result<Self> {
        let company_id = present(query.company_id.as_deref())
            .map(|raw| {
                raw.parse::<u32>().map_err(|_| {
                    PaymentError::validation("companyId", "companyId must be a positive integer")
                })
            })
            .transpose()?;
        let method = present(query.method.as_deref())
            .map(|raw| raw.parse::<PaymentMethod>())
            .transpose()?;

        Ok(PaymentFilter {
            company_id,
            date_from: parse_date(query.date_from.as_deref(), "dateFrom")?,
            date_to: parse_date(query.date_to.as_deref(), "dateTo")?,
            method,
        })
    }
}

fn parse_date(raw: Option<&str>, field: &'static str) -> Result<Option<NaiveDate>> {
    present(raw)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| PaymentError::validation(field, format!("{field} must be YYYY-MM-DD")))
        })
        .transpose()
}

/// Records a submission. A declined card still creates a record, so both
/// outcomes answer 201.
pub async fn submit(
    State(services): State<Services>,
    payload: std::result::Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(request) = payload?;
    let outcome = services.processor.submit(request).await?;
    let message = if outcome.is_approved() {
        "payment approved"
    } else {
        "payment rejected"
    };
    let view = outcome.into_view();

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": view.payment.id,
            "receiptNumber": view.payment.receipt_number,
            "status": view.payment.status,
            "rejectionReason": view.payment.rejection_reason,
            "message": message,
            "payment": view,
        })),
    ))
}

/// Newest first, each joined with the company name.
pub async fn list(
    State(services): State<Services>,
    Query(query): Query<PaymentQuery>,
) -> Result<Json<Vec<PaymentView>>> {
    let filter = PaymentFilter::try_from(query)?;
    Ok(Json(services.reports().list(&filter).await?))
}

pub async fn get(
    State(services): State<Services>,
    id: std::result::Result<Path<u32>, PathRejection>,
) -> Result<Json<PaymentView>> {
    let Path(id) = id?;
    Ok(Json(services.reports().get(id).await?))
}

pub async fn stats(
    State(services): State<Services>,
    Query(query): Query<PaymentQuery>,
) -> Result<Json<PaymentStats>> {
    let filter = PaymentFilter::try_from(query)?;
    Ok(Json(services.reports().stats(&filter).await?))
}
