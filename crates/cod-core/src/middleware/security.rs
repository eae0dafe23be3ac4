use actix_web::middleware::DefaultHeaders;

/// Baseline security headers applied to every response, including proxied
/// ones. Ambient hardening carried from the teacher regardless of this
/// spec's feature scope.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
}
