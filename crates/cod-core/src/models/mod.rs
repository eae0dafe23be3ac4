//! Data models shared across the activation engine.
//!
//! - [`error`] — per-layer error enums, the topmost implementing
//!   `actix_web::ResponseError`.
//! - [`workload`] — the `Workload` declaration loaded from YAML.

pub mod error;
pub mod workload;

pub use workload::{Workload, WorkloadFile, WORKLOAD_CONFIG_VERSION};
