use crate::application::Services;
use crate::domain::company::{Company, CompanyFields};
use crate::error::{PaymentError, Result};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

/// Active companies, sorted by name.
pub async fn list(State(services): State<Services>) -> Result<Json<Vec<Company>>> {
    Ok(Json(services.directory.list(true).await?))
}

/// A deactivated company is reported as missing here, although payments
/// still resolve it.
pub async fn get(
    State(services): State<Services>,
    id: std::result::Result<Path<u32>, PathRejection>,
) -> Result<Json<Company>> {
    let Path(id) = id?;
    let company = services.directory.get_by_id(id).await?;
    if !company.active {
        return Err(PaymentError::NotFound(format!("company {id}")));
    }
    Ok(Json(company))
}

pub async fn create(
    State(services): State<Services>,
    payload: std::result::Result<Json<CompanyFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(fields) = payload?;
    let company = services.directory.create(fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": company.id,
            "message": "company created",
            "company": company,
        })),
    ))
}

pub async fn update(
    State(services): State<Services>,
    id: std::result::Result<Path<u32>, PathRejection>,
    payload: std::result::Result<Json<CompanyFields>, JsonRejection>,
) -> Result<Json<Value>> {
    let Path(id) = id?;
    let Json(fields) = payload?;
    let company = services.directory.update(id, fields).await?;
    Ok(Json(json!({
        "message": "company updated",
        "company": company,
    })))
}

pub async fn deactivate(
    State(services): State<Services>,
    id: std::result::Result<Path<u32>, PathRejection>,
) -> Result<Json<Value>> {
    let Path(id) = id?;
    services.directory.deactivate(id).await?;
    Ok(Json(json!({ "message": "company deactivated" })))
}
