//! `cod-core`: the on-demand container-activation engine.
//!
//! A route binds an ant-style path pattern to a [`models::Workload`]
//! declaration. The first request to hit an idle route activates its
//! backend container through a [`runtime::RuntimeAdapter`], waits for it
//! to answer a health probe, then proxies the request through. An idle
//! reaper terminates containers that haven't been hit recently.
//!
//! - [`config`] — loads workload declarations from a YAML directory.
//! - [`models`] — the `Workload` type and the error enums for every layer.
//! - [`utils`] — the ant-pattern glob compiler.
//! - [`runtime`] — the seam to the container runtime (Docker in production).
//! - [`engine`] — the routing table, lifecycle state machine, and reaper.
//! - [`services`] — the reverse proxy.
//! - [`routes`] — the Actix Web handlers wiring the above to HTTP.
//! - [`middleware`] — cross-cutting response middleware.
//! - [`logs`] — logger configuration.

pub mod config;
pub mod engine;
pub mod logs;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;
