//! The activation engine: routing table, lifecycle state machine, idle
//! reaper, and readiness probing.

pub mod activation;
pub mod probe;
pub mod reaper;
pub mod route;

pub use activation::Engine;
pub use route::{ContainerInstance, ContainerState};
