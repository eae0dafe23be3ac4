//! An in-memory `RuntimeAdapter` for exercising the activation engine
//! without a live Docker daemon.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::error::RuntimeError;

use super::adapter::{ContainerSummary, CreateContainerSpec, PortMapping, RuntimeAdapter};

#[derive(Debug, Clone)]
struct MockContainer {
    state: String,
    labels: Vec<(String, String)>,
    container_port: u16,
}

/// Records every create/start/stop/kill call so tests can assert on the
/// engine's behavior (single creation per activation, reaper eviction, ...).
pub struct MockRuntime {
    next_id: AtomicU64,
    containers: Mutex<HashMap<String, MockContainer>>,
    pub fail_create: std::sync::atomic::AtomicBool,
    pub fail_start: std::sync::atomic::AtomicBool,
}

impl Default for MockRuntime {
    fn default() -> Self {
        MockRuntime {
            next_id: AtomicU64::new(1),
            containers: Mutex::new(HashMap::new()),
            fail_create: std::sync::atomic::AtomicBool::new(false),
            fail_start: std::sync::atomic::AtomicBool::new(false),
        }
    }
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_count(&self) -> usize {
        self.containers.lock().unwrap().len()
    }

    pub fn running_count(&self) -> usize {
        self.containers
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.state == "running")
            .count()
    }
}

#[async_trait]
impl RuntimeAdapter for MockRuntime {
    async fn pull_image(&self, _image: &str) -> Result<(), RuntimeError> {
        Ok(())
    }

    async fn list_containers(
        &self,
        label_filters: &[(String, String)],
    ) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let containers = self.containers.lock().unwrap();
        Ok(containers
            .iter()
            .filter(|(_, c)| {
                label_filters
                    .iter()
                    .all(|(k, v)| c.labels.iter().any(|(lk, lv)| lk == k && lv == v))
            })
            .map(|(id, c)| ContainerSummary {
                id: id.clone(),
                state: c.state.clone(),
            })
            .collect())
    }

    async fn create_container(&self, spec: &CreateContainerSpec) -> Result<String, RuntimeError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RuntimeError::CreateFailed("mock configured to fail".into()));
        }
        let id = format!("mock-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.containers.lock().unwrap().insert(
            id.clone(),
            MockContainer {
                state: "created".to_string(),
                labels: spec.labels.clone(),
                container_port: spec.container_port,
            },
        );
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(RuntimeError::StartFailed("mock configured to fail".into()));
        }
        let mut containers = self.containers.lock().unwrap();
        let container = containers
            .get_mut(id)
            .ok_or_else(|| RuntimeError::StartFailed(format!("unknown container {id}")))?;
        container.state = "running".to_string();
        Ok(())
    }

    async fn inspect_mapped_port(
        &self,
        id: &str,
        _container_port: u16,
    ) -> Result<PortMapping, RuntimeError> {
        let containers = self.containers.lock().unwrap();
        let container = containers
            .get(id)
            .ok_or_else(|| RuntimeError::InspectFailed(format!("unknown container {id}")))?;
        // Deterministic mock port derived from the container's own port so
        // tests can assert on it without a real bind.
        Ok(PortMapping {
            host_port: container.container_port,
        })
    }

    async fn stop_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.containers.lock().unwrap().remove(id);
        Ok(())
    }

    async fn kill_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.containers.lock().unwrap().remove(id);
        Ok(())
    }
}
