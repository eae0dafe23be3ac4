//! Error kinds for every layer of the activation engine.
//!
//! Mirrors the teacher's `GatewayError` split: one `thiserror` enum per
//! layer, with the outermost (`ProxyError`) implementing
//! `actix_web::ResponseError` so handlers can just `?` their way out.

use actix_web::HttpResponse;
use serde_json::json;

/// Errors raised while loading or validating workload declarations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{path}: unsupported or missing version (expected cod:config/v1)")]
    Invalid { path: String },
    #[error("{path}: {reason}")]
    Malformed { path: String, reason: String },
    #[error("pattern compile failed for workload {name}: {reason}")]
    PatternInvalid { name: String, reason: String },
    #[error("workload {name} pattern is ambiguous with an existing workload's pattern")]
    AmbiguousPattern { name: String },
    #[error("failed to read config directory {dir}: {source}")]
    Io {
        dir: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the container runtime adapter.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("container runtime unreachable: {0}")]
    Unreachable(String),
    #[error("image pull failed for {image}: {reason}")]
    ImagePullFailed { image: String, reason: String },
    #[error("container create failed: {0}")]
    CreateFailed(String),
    #[error("container start failed: {0}")]
    StartFailed(String),
    #[error("container inspect failed: {0}")]
    InspectFailed(String),
    #[error("container kill failed: {0}")]
    KillFailed(String),
    #[error("no free host port could be allocated: {0}")]
    PortAllocationFailed(String),
}

/// Errors surfaced by `Engine::get_or_start_container`.
#[derive(Debug, thiserror::Error, Clone)]
pub enum ActivationError {
    #[error("no route matches path {path}")]
    RouteNotFound { path: String },
    #[error("container did not become ready in time")]
    NotReady,
    #[error("container create failed: {0}")]
    ContainerCreateFailed(String),
    #[error("container start failed: {0}")]
    ContainerStartFailed(String),
    #[error("engine is shutting down")]
    ShutdownInProgress,
}

impl From<RuntimeError> for ActivationError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::CreateFailed(msg) => ActivationError::ContainerCreateFailed(msg),
            RuntimeError::StartFailed(msg) => ActivationError::ContainerStartFailed(msg),
            other => ActivationError::ContainerCreateFailed(other.to_string()),
        }
    }
}

/// Errors the reverse proxy can hand back to an HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Activation(#[from] ActivationError),
    #[error("downstream request failed: {0}")]
    DownstreamUnreachable(String),
}

impl actix_web::error::ResponseError for ProxyError {
    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        match self {
            // RouteNotFound is intentionally 500, not 404: the contract is
            // flagged as an open question upstream, not a mandated change.
            ProxyError::Activation(_) => HttpResponse::InternalServerError().json(json!({
                "error": message,
                "type": "activation",
            })),
            ProxyError::DownstreamUnreachable(_) => HttpResponse::BadGateway().json(json!({
                "error": message,
                "type": "downstream",
            })),
        }
    }
}
