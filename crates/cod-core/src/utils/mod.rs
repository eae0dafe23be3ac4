//! Supporting utilities for the activation engine.
//!
//! - [`ant_pattern`] — ant-style glob compiler used by `engine::route` to
//!   match inbound paths against workload declarations.

pub mod ant_pattern;

pub use ant_pattern::{AntPattern, PatternError};
