//! A single registered route: pattern, workload, and its live instance slot.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::models::Workload;
use crate::utils::AntPattern;

/// Lifecycle of the container instance backing a route.
///
/// `Creating -> Starting -> Probing -> Ready -> Draining -> Terminated`,
/// with `Failed` reachable from the first three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Creating,
    Starting,
    Probing,
    Ready,
    Draining,
    Terminated,
    Failed,
}

/// A live (or dying) container instance for a route.
#[derive(Debug, Clone)]
pub struct ContainerInstance {
    pub container_id: String,
    pub state: ContainerState,
    pub endpoint: String,
}

/// Slot holding at most one container instance for a route at a time.
///
/// `None` means the route has never been activated, or its instance was
/// reaped/terminated and not yet replaced.
pub type SlotState = Option<ContainerInstance>;

/// A route: a compiled pattern bound to a workload, with its instance slot
/// and idle-tracking timestamp.
///
/// The slot's `tokio::sync::Mutex` is held across the *entire* activation
/// sequence by `engine::activation` — this is what gives the engine its
/// at-most-one-activation guarantee: a second caller racing the first
/// blocks on this same lock and observes the first caller's outcome rather
/// than starting a second container.
pub struct Route {
    pub pattern: AntPattern,
    pub workload: Workload,
    pub slot: Mutex<SlotState>,
    last_hit_millis: AtomicI64,
}

impl Route {
    pub fn new(pattern: AntPattern, workload: Workload) -> Self {
        Route {
            pattern,
            workload,
            slot: Mutex::new(None),
            last_hit_millis: AtomicI64::new(0),
        }
    }

    pub fn touch(&self) {
        self.last_hit_millis.store(now_millis(), Ordering::Relaxed);
    }

    pub fn idle_for_millis(&self) -> i64 {
        now_millis() - self.last_hit_millis.load(Ordering::Relaxed)
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
