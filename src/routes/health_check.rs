use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::store::UserStore;

/// GET /health_check
///
/// Liveness only; the datastore is not contacted.
pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().body("OK")
}

/// GET /health_check/ready
///
/// Readiness: round-trips to the datastore under the store's timeout.
///
/// # Errors
/// - 500: Datastore unreachable or timed out
pub async fn readiness_check(store: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    store.ping().await?;
    Ok(HttpResponse::Ok().body("READY"))
}
