//! REST surface over [`Services`].
//!
//! Every route lives under `/api`, with Spanish aliases (`/api/empresas`,
//! `/api/pagos`) kept for existing front ends.

pub mod companies;
pub mod error;
pub mod payments;

use crate::application::Services;
use crate::error::Result;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub fn router(services: Services) -> Router {
    let mut api = Router::new();
    for prefix in ["/companies", "/empresas"] {
        api = api
            .route(prefix, get(companies::list).post(companies::create))
            .route(
                &format!("{prefix}/{{id}}"),
                get(companies::get)
                    .put(companies::update)
                    .delete(companies::deactivate),
            );
    }
    for prefix in ["/payments", "/pagos"] {
        api = api
            .route(prefix, get(payments::list).post(payments::submit))
            .route(&format!("{prefix}/stats"), get(payments::stats))
            .route(&format!("{prefix}/{{id}}"), get(payments::get));
    }

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(services)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Serves until the process receives Ctrl-C, then waits for pending
/// replication.
pub async fn serve(listener: TcpListener, services: Services) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening");
    }
    let processor = Arc::clone(&services.processor);
    axum::serve(listener, router(services))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    processor.drain_replication().await;
    Ok(())
}
