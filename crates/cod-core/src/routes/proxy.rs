//! The catch-all proxy resource, mirroring the teacher's
//! `routes::http::configure_route` shape (`/{tail:.*}` backed by a
//! `RouteHandler`), generalized to call the activation engine.

use actix_web::{web, HttpRequest, HttpResponse, Result};

use crate::models::error::ProxyError;
use crate::services::ProxyService;

async fn proxy_handler(
    req: HttpRequest,
    body: web::Bytes,
    proxy: web::Data<ProxyService>,
) -> Result<HttpResponse, ProxyError> {
    proxy.forward(&req, body).await
}

/// Mounts the catch-all `/{tail:.*}` proxy resource. Must be configured
/// *after* the ambient health routes so `/healthz`, `/readyz`, and
/// `/livez` are matched first.
pub fn configure_proxy(cfg: &mut web::ServiceConfig) {
    cfg.route("/{tail:.*}", web::to(proxy_handler));
}
