//! The `Workload` declaration: one YAML file, one on-demand backend.

use std::time::Duration;

use serde::Deserialize;

/// Version string every workload file must declare exactly.
pub const WORKLOAD_CONFIG_VERSION: &str = "cod:config/v1";

const DEFAULT_MEMORY_LIMIT_BYTES: u64 = 20 * 1024 * 1024;
const DEFAULT_CPU_SHARE: u32 = 10;
const DEFAULT_MAX_IDLE_TIME: Duration = Duration::from_secs(30);
const DEFAULT_HOST_ADDRESS: &str = "127.0.0.1";

/// Raw shape of a workload YAML file, before normalization.
///
/// `#[serde(deny_unknown_fields)]` catches config typos at load time; the
/// Go source this was distilled from had no such guard, but it matches the
/// teacher's generally defensive config posture.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadFile {
    pub version: String,
    pub name: Option<String>,
    #[serde(rename = "path")]
    pub path_pattern: String,
    pub image: String,
    #[serde(rename = "port")]
    pub container_port: u16,
    #[serde(rename = "hostAddress")]
    pub host_address: Option<String>,
    #[serde(rename = "hostPort")]
    pub host_port: Option<u16>,
    pub memory: Option<bytesize::ByteSize>,
    #[serde(rename = "cpu")]
    pub cpu_share: Option<u32>,
    #[serde(rename = "maxIdleTime", with = "humantime_serde::option", default)]
    pub max_idle_time: Option<Duration>,
}

/// A normalized, fully-defaulted workload ready to be registered as a route.
#[derive(Debug, Clone)]
pub struct Workload {
    pub name: String,
    pub path_pattern: String,
    pub image: String,
    pub container_port: u16,
    pub host_address: String,
    pub host_port: u16,
    pub memory_limit_bytes: u64,
    pub cpu_share: u32,
    pub max_idle_time: Duration,
    pub version: String,
    pub source_filename: String,
    pub content_checksum: String,
}

impl Workload {
    /// Builds a normalized workload from its raw file form plus the two
    /// pieces only the loader knows: where it came from and its checksum.
    pub fn from_file(
        file: WorkloadFile,
        default_name: &str,
        source_filename: String,
        content_checksum: String,
    ) -> Self {
        let max_idle_time = match file.max_idle_time {
            Some(d) if d.as_nanos() > 0 => d,
            _ => DEFAULT_MAX_IDLE_TIME,
        };
        Workload {
            name: file.name.unwrap_or_else(|| default_name.to_string()),
            path_pattern: file.path_pattern,
            image: file.image,
            container_port: file.container_port,
            host_address: file
                .host_address
                .unwrap_or_else(|| DEFAULT_HOST_ADDRESS.to_string()),
            host_port: file.host_port.unwrap_or(0),
            memory_limit_bytes: file
                .memory
                .map(|m| m.as_u64())
                .unwrap_or(DEFAULT_MEMORY_LIMIT_BYTES),
            cpu_share: file.cpu_share.unwrap_or(DEFAULT_CPU_SHARE),
            max_idle_time,
            version: file.version,
            source_filename,
            content_checksum,
        }
    }
}
