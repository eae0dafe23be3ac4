//! Workload configuration loading.

pub mod workload_file;

pub use workload_file::{config_dir_from_env, load_workloads};
