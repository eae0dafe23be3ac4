//! Background janitor that terminates idle containers.
//!
//! Decoupled from `Engine` via a `Weak<EngineState>`: the reaper never
//! keeps the engine alive, and `Engine::shutdown` can cancel and join it
//! deterministically instead of relying on a cyclic Arc tearing itself down.

use std::sync::Weak;
use std::time::Duration;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::activation::EngineState;
use super::route::ContainerState;

pub fn spawn_reaper(
    state: Weak<EngineState>,
    cancel: CancellationToken,
    tick: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("reaper: shutdown requested, stopping");
                    return;
                }
                _ = interval.tick() => {}
            }

            let Some(state) = state.upgrade() else {
                info!("reaper: engine dropped, stopping");
                return;
            };

            sweep_idle_routes(&state).await;
        }
    })
}

async fn sweep_idle_routes(state: &EngineState) {
    let routes = state.routes().read().await;
    for route in routes.iter() {
        if route.idle_for_millis() < route.workload.max_idle_time.as_millis() as i64 {
            continue;
        }

        let mut slot = route.slot.lock().await;
        let Some(instance) = slot.as_ref() else {
            continue;
        };
        if instance.state != ContainerState::Ready {
            continue;
        }
        if route.idle_for_millis() < route.workload.max_idle_time.as_millis() as i64 {
            // Touched again while we were waiting on the slot lock.
            continue;
        }

        info!(
            "reaper: evicting idle container {} for workload {}",
            instance.container_id, route.workload.name
        );
        if let Err(e) = state.runtime().kill_container(&instance.container_id).await {
            warn!(
                "reaper: failed to kill container {}: {e}",
                instance.container_id
            );
        }
        *slot = None;
    }
}
