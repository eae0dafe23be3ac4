//! The activation engine: workload registry, on-demand container
//! activation, and coordinated shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::models::error::{ActivationError, ConfigError};
use crate::models::Workload;
use crate::runtime::{CreateContainerSpec, RuntimeAdapter};
use crate::utils::AntPattern;

use super::probe::wait_until_ready;
use super::reaper::spawn_reaper;
use super::route::{ContainerInstance, ContainerState, Route};

const MANAGED_LABEL: (&str, &str) = ("cod:managed", "true");
const REAPER_TICK: Duration = Duration::from_secs(1);
const SESSION_ID_LEN: usize = 8;

/// Shared state reachable both from request-handling tasks (via `Engine`,
/// a strong `Arc`) and the reaper task (via a `Weak` handle), so the
/// reaper can never keep the engine alive past `shutdown`.
pub struct EngineState {
    routes: RwLock<Vec<Arc<Route>>>,
    runtime: Arc<dyn RuntimeAdapter>,
    http_client: reqwest::Client,
    session_id: String,
    name_counter: AtomicU64,
}

impl EngineState {
    pub(crate) fn routes(&self) -> &RwLock<Vec<Arc<Route>>> {
        &self.routes
    }

    pub(crate) fn runtime(&self) -> &Arc<dyn RuntimeAdapter> {
        &self.runtime
    }
}

/// Public handle to the activation engine. Owns the reaper task and its
/// cancellation token; dropping/`shutdown`-ing this is the only way the
/// background reaper stops.
pub struct Engine {
    state: Arc<EngineState>,
    cancel: CancellationToken,
    reaper_handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Engine {
    pub fn new(runtime: Arc<dyn RuntimeAdapter>, http_client: reqwest::Client) -> Self {
        let session_id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect();

        let state = Arc::new(EngineState {
            routes: RwLock::new(Vec::new()),
            runtime,
            http_client,
            session_id,
            name_counter: AtomicU64::new(0),
        });

        let cancel = CancellationToken::new();
        let reaper_handle = spawn_reaper(Arc::downgrade(&state), cancel.clone(), REAPER_TICK);

        Engine {
            state,
            cancel,
            reaper_handle: tokio::sync::Mutex::new(Some(reaper_handle)),
        }
    }

    /// Compiles and registers a workload's route, rejecting ambiguous
    /// pattern collisions with an already-registered route.
    pub async fn add_workload(&self, workload: Workload) -> Result<(), ConfigError> {
        let pattern =
            AntPattern::compile(&workload.path_pattern).map_err(|e| ConfigError::PatternInvalid {
                name: workload.name.clone(),
                reason: e.to_string(),
            })?;

        let mut routes = self.state.routes.write().await;
        if let Some(existing) = routes
            .iter()
            .find(|r| patterns_ambiguous(&r.pattern, &pattern))
        {
            warn!(
                "workload {} pattern {:?} is ambiguous with existing workload {} pattern {:?}",
                workload.name, pattern.source, existing.workload.name, existing.pattern.source
            );
            return Err(ConfigError::AmbiguousPattern { name: workload.name });
        }

        info!(
            "registered workload {} at pattern {:?} -> image {}",
            workload.name, pattern.source, workload.image
        );
        routes.push(Arc::new(Route::new(pattern, workload)));
        Ok(())
    }

    /// Sweeps any containers left over from a previous process (labeled
    /// `cod:managed=true`) and kills them. The sole crash-recovery
    /// mechanism: process state is otherwise entirely ephemeral.
    pub async fn cleanup(&self) {
        match self
            .state
            .runtime
            .list_containers(&[(MANAGED_LABEL.0.to_string(), MANAGED_LABEL.1.to_string())])
            .await
        {
            Ok(containers) => {
                for container in containers {
                    info!("cleanup: killing stale managed container {}", container.id);
                    if let Err(e) = self.state.runtime.kill_container(&container.id).await {
                        warn!("cleanup: failed to kill {}: {e}", container.id);
                    }
                }
            }
            Err(e) => warn!("cleanup: failed to list managed containers: {e}"),
        }
    }

    /// Resolves `path` against registered routes and returns the backend
    /// endpoint and downstream path, activating (or reusing) a container
    /// as needed.
    ///
    /// The per-route slot mutex is held across the whole activation
    /// sequence, so a second caller racing the first on a cold route
    /// blocks here and observes the first caller's outcome rather than
    /// triggering a second container start.
    pub async fn get_or_start_container(
        &self,
        path: &str,
    ) -> Result<(String, String), ActivationError> {
        let route = self.find_route(path).await?;
        let downstream = route
            .pattern
            .match_downstream(path)
            .unwrap_or("")
            .to_string();

        let mut slot = route.slot.lock().await;

        if let Some(instance) = slot.as_ref() {
            if instance.state == ContainerState::Ready {
                route.touch();
                return Ok((instance.endpoint.clone(), downstream));
            }
        }

        let instance = self.activate(&route).await?;
        let endpoint = instance.endpoint.clone();
        *slot = Some(instance);
        route.touch();
        Ok((endpoint, downstream))
    }

    /// Cancels the reaper and stops every currently-ready container.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.reaper_handle.lock().await.take() {
            let _ = handle.await;
        }

        let routes = self.state.routes.read().await;
        for route in routes.iter() {
            let mut slot = route.slot.lock().await;
            if let Some(instance) = slot.take() {
                if let Err(e) = self.state.runtime.stop_container(&instance.container_id).await {
                    warn!(
                        "shutdown: failed to stop container {}: {e}",
                        instance.container_id
                    );
                }
            }
        }
    }

    /// Best-effort teardown of a container that was created but never made
    /// it to `Ready` — a failed start, inspect, or readiness probe all leave
    /// a live container behind that nothing else will ever clean up.
    async fn kill_partial(&self, container_id: &str) {
        if let Err(e) = self.state.runtime.kill_container(container_id).await {
            warn!("activate: failed to kill partially-created container {container_id}: {e}");
        }
    }

    async fn find_route(&self, path: &str) -> Result<Arc<Route>, ActivationError> {
        let routes = self.state.routes.read().await;
        routes
            .iter()
            .filter(|r| r.pattern.is_match(path))
            .max_by_key(|r| r.pattern.specificity)
            .cloned()
            .ok_or_else(|| ActivationError::RouteNotFound {
                path: path.to_string(),
            })
    }

    async fn activate(&self, route: &Route) -> Result<ContainerInstance, ActivationError> {
        let workload = &route.workload;

        if let Err(e) = self.state.runtime.pull_image(&workload.image).await {
            // Image-pull failures are logged and non-fatal: the image may
            // already be present locally, matching both the Go source and
            // the teacher's posture toward best-effort warm-up steps.
            warn!("pull_image({}) failed, continuing: {e}", workload.image);
        }

        let counter = self.state.name_counter.fetch_add(1, Ordering::SeqCst);
        let name = format!(
            "cod_{}_{}_{}",
            self.state.session_id, workload.name, counter
        );

        let labels = vec![
            (MANAGED_LABEL.0.to_string(), MANAGED_LABEL.1.to_string()),
            ("cod:configFilename".to_string(), workload.source_filename.clone()),
            ("cod:configChecksum".to_string(), workload.content_checksum.clone()),
        ];

        let spec = CreateContainerSpec {
            name,
            image: workload.image.clone(),
            container_port: workload.container_port,
            host_address: workload.host_address.clone(),
            host_port: workload.host_port,
            memory_limit_bytes: workload.memory_limit_bytes,
            cpu_share: workload.cpu_share,
            labels,
        };

        let container_id = self
            .state
            .runtime
            .create_container(&spec)
            .await
            .map_err(|e| ActivationError::ContainerCreateFailed(e.to_string()))?;

        if let Err(e) = self.state.runtime.start_container(&container_id).await {
            self.kill_partial(&container_id).await;
            return Err(ActivationError::ContainerStartFailed(e.to_string()));
        }

        let mapping = match self
            .state
            .runtime
            .inspect_mapped_port(&container_id, workload.container_port)
            .await
        {
            Ok(mapping) => mapping,
            Err(e) => {
                self.kill_partial(&container_id).await;
                return Err(ActivationError::ContainerStartFailed(e.to_string()));
            }
        };

        let endpoint = format!("{}:{}", workload.host_address, mapping.host_port);

        if !wait_until_ready(&self.state.http_client, &endpoint).await {
            self.kill_partial(&container_id).await;
            return Err(ActivationError::NotReady);
        }

        info!(
            "activated workload {} as container {container_id} at {endpoint}",
            workload.name
        );

        Ok(ContainerInstance {
            container_id,
            state: ContainerState::Ready,
            endpoint,
        })
    }
}

/// Approximate ambiguity check: exact duplicate patterns are always
/// ambiguous; same-specificity patterns are flagged if a representative
/// path built from one also matches the other, since no registration order
/// then strictly dominates.
fn patterns_ambiguous(a: &AntPattern, b: &AntPattern) -> bool {
    if a.source == b.source {
        return true;
    }
    if a.specificity != b.specificity {
        return false;
    }
    let probe = representative_path(&a.source);
    a.is_match(&probe) && b.is_match(&probe)
}

fn representative_path(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| {
            if segment == "**" {
                "probe-wild".to_string()
            } else {
                segment
                    .chars()
                    .map(|c| if c == '*' || c == '?' { 'x' } else { c })
                    .collect()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
