//! HTTP route configuration: ambient health endpoints plus the catch-all
//! proxy resource.

pub mod health;
pub mod proxy;

pub use health::configure_health;
pub use proxy::configure_proxy;
