//! Asynchronous delivery of lifecycle events.

use std::sync::Arc;

use super::lifecycle_service::LifecycleAuthority;
use crate::listener::LifecycleEvent;
use crate::runtime::ExecutionService;

/// Hands lifecycle events to the execution service.
///
/// `dispatch` returns immediately; the event is fired on a background task
/// so a listener can never stall a connect cycle or the reconnection worker.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    execution: Arc<dyn ExecutionService>,
    lifecycle: Arc<dyn LifecycleAuthority>,
}

impl EventDispatcher {
    /// Creates a dispatcher firing into `lifecycle` via `execution`.
    pub fn new(execution: Arc<dyn ExecutionService>, lifecycle: Arc<dyn LifecycleAuthority>) -> Self {
        Self {
            execution,
            lifecycle,
        }
    }

    /// Schedules `event` for delivery and returns without waiting for it.
    pub fn dispatch(&self, event: LifecycleEvent) {
        tracing::trace!(event = %event, "dispatching lifecycle event");
        let lifecycle = Arc::clone(&self.lifecycle);
        self.execution.execute(Box::pin(async move {
            lifecycle.fire_lifecycle_event(event);
        }));
    }
}
