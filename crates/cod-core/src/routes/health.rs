//! Ambient health endpoints, carried over from the teacher even though
//! observability surfaces are outside this spec's feature scope — they're
//! mounted ahead of the catch-all proxy resource so they never collide
//! with a workload's own path space.

use actix_web::{web, HttpResponse, Result};
use serde_json::json;

/// General health check: status, version, current timestamp.
pub async fn health_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// Readiness probe. The gateway itself has no external dependencies to
/// check (containers are activated lazily, not at startup), so this is
/// equivalent to liveness today.
pub async fn readiness_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ready",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// Liveness probe. Should only ever fail if the process is wedged badly
/// enough that it can't schedule this handler at all.
pub async fn liveness_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "alive",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

pub fn configure_health(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(health_check))
        .route("/readyz", web::get().to(readiness_check))
        .route("/livez", web::get().to(liveness_check));
}
