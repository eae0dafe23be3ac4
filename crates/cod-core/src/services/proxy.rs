//! Reverse proxy: activates a backend on demand, then forwards the request.
//!
//! Built the way the teacher's `services::http::RouteHandler` forwards
//! requests (pooled `reqwest::Client`, header filtering, status/body
//! passthrough), generalized to resolve `(endpoint, downstream_path)`
//! through the activation engine instead of a static route table.

use std::time::Duration;

use actix_web::http::{Method as ActixMethod, StatusCode as ActixStatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method as ReqwestMethod;

use crate::engine::Engine;
use crate::models::error::ProxyError;

/// Headers that must not be forwarded verbatim between hops — either
/// hop-by-hop per RFC 7230, or ones whose stale value would corrupt the
/// proxied request/response (`Host`, body-framing headers).
const SKIP_REQUEST_HEADERS: &[&str] = &[
    "host",
    "connection",
    "content-length",
    "transfer-encoding",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "upgrade",
];

const SKIP_RESPONSE_HEADERS: &[&str] = &[
    "connection",
    "content-length",
    "transfer-encoding",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "upgrade",
];

pub struct ProxyService {
    client: reqwest::Client,
    engine: web::Data<Engine>,
}

impl ProxyService {
    pub fn new(engine: web::Data<Engine>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build downstream reqwest client");
        ProxyService { client, engine }
    }

    /// Resolves the inbound path to a (possibly freshly-activated) backend
    /// and forwards the request with its original request-URI untouched,
    /// buffering the body in memory like the teacher and the original Go
    /// proxy both do.
    pub async fn forward(
        &self,
        req: &HttpRequest,
        body: web::Bytes,
    ) -> Result<HttpResponse, ProxyError> {
        let (endpoint, _downstream_path) = self.engine.get_or_start_container(req.path()).await?;

        // The backend sees the inbound request-URI verbatim, unstripped of
        // whatever prefix matched — the engine's downstream_path exists for
        // route resolution, not for rewriting what the container receives.
        let url = format!("http://{endpoint}{}", req.uri());
        let method = translate_method(req.method());
        let mut builder = self.client.request(method, &url).body(body.to_vec());

        builder = builder.headers(forward_request_headers(req));

        let response = builder
            .send()
            .await
            .map_err(|e| ProxyError::DownstreamUnreachable(e.to_string()))?;

        let mut client_response = HttpResponse::build(translate_status(response.status()));
        for (name, value) in response.headers() {
            if SKIP_RESPONSE_HEADERS.contains(&name.as_str()) {
                continue;
            }
            if let Ok(actix_name) = actix_web::http::header::HeaderName::from_bytes(name.as_str().as_bytes()) {
                if let Ok(actix_value) = actix_web::http::header::HeaderValue::from_bytes(value.as_bytes()) {
                    client_response.insert_header((actix_name, actix_value));
                }
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::DownstreamUnreachable(e.to_string()))?;

        Ok(client_response.body(body))
    }
}

fn forward_request_headers(req: &HttpRequest) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in req.headers() {
        if SKIP_REQUEST_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let (Ok(n), Ok(v)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.insert(n, v);
        }
    }
    headers
}

fn translate_method(method: &ActixMethod) -> ReqwestMethod {
    ReqwestMethod::from_bytes(method.as_str().as_bytes()).unwrap_or(ReqwestMethod::GET)
}

fn translate_status(status: reqwest::StatusCode) -> ActixStatusCode {
    ActixStatusCode::from_u16(status.as_u16()).unwrap_or(ActixStatusCode::BAD_GATEWAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn host_and_framing_headers_are_stripped() {
        let req = TestRequest::get()
            .uri("/anything")
            .insert_header(("Host", "original-host.example"))
            .insert_header(("Content-Length", "42"))
            .insert_header(("X-Request-Id", "abc-123"))
            .to_http_request();

        let headers = forward_request_headers(&req);
        assert!(!headers.contains_key("host"));
        assert!(!headers.contains_key("content-length"));
        assert_eq!(headers.get("x-request-id").unwrap(), "abc-123");
    }

    #[test]
    fn method_round_trips_through_the_reqwest_type() {
        assert_eq!(translate_method(&ActixMethod::POST), ReqwestMethod::POST);
        assert_eq!(translate_method(&ActixMethod::DELETE), ReqwestMethod::DELETE);
    }

    #[test]
    fn status_round_trips_through_the_actix_type() {
        assert_eq!(
            translate_status(reqwest::StatusCode::NOT_FOUND),
            ActixStatusCode::NOT_FOUND
        );
        assert_eq!(
            translate_status(reqwest::StatusCode::OK),
            ActixStatusCode::OK
        );
    }
}
