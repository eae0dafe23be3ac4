//! `RuntimeAdapter` backed by a real Docker daemon via `bollard`.

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, CreateImageOptionsBuilder, KillContainerOptionsBuilder,
    ListContainersOptionsBuilder, RemoveContainerOptionsBuilder, StartContainerOptionsBuilder,
    StopContainerOptionsBuilder,
};
use bollard::Docker;
use futures_util::TryStreamExt;
use log::warn;

use crate::models::error::RuntimeError;

use super::adapter::{ContainerSummary, CreateContainerSpec, PortMapping, RuntimeAdapter};

/// Connects to the local Docker daemon using its platform-default transport
/// (Unix socket on Linux/macOS, named pipe on Windows).
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    pub fn connect() -> Result<Self, RuntimeError> {
        let client = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Unreachable(e.to_string()))?;
        Ok(DockerRuntime { client })
    }

    pub async fn ping(&self) -> Result<(), RuntimeError> {
        self.client
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| RuntimeError::Unreachable(e.to_string()))
    }
}

#[async_trait]
impl RuntimeAdapter for DockerRuntime {
    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError> {
        self.client
            .create_image(
                Some(CreateImageOptionsBuilder::new().from_image(image).build()),
                None,
                None,
            )
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| RuntimeError::ImagePullFailed {
                image: image.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn list_containers(
        &self,
        label_filters: &[(String, String)],
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let mut filters: HashMap<String, Vec<String>> = HashMap::new();
        let labels: Vec<String> = label_filters
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        if !labels.is_empty() {
            filters.insert("label".to_string(), labels);
        }

        let options = ListContainersOptionsBuilder::new()
            .all(true)
            .filters(&filters)
            .build();

        let containers = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(|e| RuntimeError::Unreachable(e.to_string()))?;

        Ok(containers
            .into_iter()
            .filter_map(|c| {
                Some(ContainerSummary {
                    id: c.id?,
                    state: c.state.map(|s| s.to_string()).unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn create_container(&self, spec: &CreateContainerSpec) -> Result<String, RuntimeError> {
        let container_port_key = format!("{}/tcp", spec.container_port);

        let mut port_bindings = HashMap::new();
        let host_port_str = if spec.host_port == 0 {
            String::new()
        } else {
            spec.host_port.to_string()
        };
        port_bindings.insert(
            container_port_key.clone(),
            Some(vec![PortBinding {
                host_ip: Some(spec.host_address.clone()),
                host_port: Some(host_port_str),
            }]),
        );

        let labels: HashMap<String, String> = spec.labels.iter().cloned().collect();

        let config = ContainerCreateBody {
            image: Some(spec.image.clone()),
            labels: Some(labels),
            exposed_ports: Some(HashMap::from([(container_port_key, Default::default())])),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                memory: Some(spec.memory_limit_bytes as i64),
                cpu_shares: Some(spec.cpu_share as i64),
                auto_remove: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = CreateContainerOptionsBuilder::new()
            .name(&spec.name)
            .build();

        let response = self
            .client
            .create_container(Some(options), config)
            .await
            .map_err(|e| RuntimeError::CreateFailed(e.to_string()))?;

        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.client
            .start_container(id, Some(StartContainerOptionsBuilder::new().build()))
            .await
            .map_err(|e| RuntimeError::StartFailed(e.to_string()))
    }

    async fn inspect_mapped_port(
        &self,
        id: &str,
        container_port: u16,
    ) -> Result<PortMapping, RuntimeError> {
        let info = self
            .client
            .inspect_container(id, None)
            .await
            .map_err(|e| RuntimeError::InspectFailed(e.to_string()))?;

        let key = format!("{container_port}/tcp");
        let host_port = info
            .network_settings
            .as_ref()
            .and_then(|n| n.ports.as_ref())
            .and_then(|ports| ports.get(&key))
            .and_then(|bindings| bindings.as_ref())
            .and_then(|bindings| bindings.first())
            .and_then(|b| b.host_port.as_deref())
            .ok_or_else(|| RuntimeError::InspectFailed(format!("no host port bound for {key}")))?
            .parse::<u16>()
            .map_err(|e| RuntimeError::InspectFailed(e.to_string()))?;

        Ok(PortMapping { host_port })
    }

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.client
            .stop_container(id, Some(StopContainerOptionsBuilder::new().t(5).build()))
            .await
            .map_err(|e| RuntimeError::KillFailed(e.to_string()))?;
        if let Err(e) = self
            .client
            .remove_container(id, Some(RemoveContainerOptionsBuilder::new().force(true).build()))
            .await
        {
            warn!("failed to remove stopped container {id}: {e}");
        }
        Ok(())
    }

    async fn kill_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.client
            .kill_container(id, Some(KillContainerOptionsBuilder::new().build()))
            .await
            .map_err(|e| RuntimeError::KillFailed(e.to_string()))?;
        if let Err(e) = self
            .client
            .remove_container(id, Some(RemoveContainerOptionsBuilder::new().force(true).build()))
            .await
        {
            warn!("failed to remove killed container {id}: {e}");
        }
        Ok(())
    }
}
