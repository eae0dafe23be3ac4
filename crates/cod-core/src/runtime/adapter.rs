//! The narrow seam between the activation engine and a container runtime.

use async_trait::async_trait;

use crate::models::error::RuntimeError;

/// Summary of one container as reported by the runtime.
#[derive(Debug, Clone)]
pub struct ContainerSummary {
    pub id: String,
    pub state: String,
}

/// Parameters for creating a new container for a workload activation.
#[derive(Debug, Clone)]
pub struct CreateContainerSpec {
    pub name: String,
    pub image: String,
    pub container_port: u16,
    pub host_address: String,
    pub host_port: u16,
    pub memory_limit_bytes: u64,
    pub cpu_share: u32,
    pub labels: Vec<(String, String)>,
}

/// Where a created container's mapped port ended up.
#[derive(Debug, Clone, Copy)]
pub struct PortMapping {
    pub host_port: u16,
}

/// Everything the activation engine needs from a container runtime.
///
/// Kept deliberately narrow — this is not a general Docker client, only the
/// handful of calls the engine's lifecycle state machine makes.
#[async_trait]
pub trait RuntimeAdapter: Send + Sync {
    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError>;

    async fn list_containers(
        &self,
        label_filters: &[(String, String)],
    ) -> Result<Vec<ContainerSummary>, RuntimeError>;

    async fn create_container(&self, spec: &CreateContainerSpec) -> Result<String, RuntimeError>;

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError>;

    async fn inspect_mapped_port(
        &self,
        id: &str,
        container_port: u16,
    ) -> Result<PortMapping, RuntimeError>;

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError>;

    async fn kill_container(&self, id: &str) -> Result<(), RuntimeError>;
}
