//! Execution facility used for fire-and-forget background work.
//!
//! Lifecycle notifications and escalated shutdowns are handed to an
//! [`ExecutionService`] so they never run on the task that noticed the
//! state change. The default implementation, [`TokioExecutionService`],
//! spawns onto the ambient Tokio runtime.
//!
//! # Example
//!
//! ```rust
//! use hazelcast_cluster::runtime::{ExecutionService, TokioExecutionService};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let executor = TokioExecutionService;
//! executor.execute(Box::pin(async { /* background work */ }));
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;

/// A unit of background work.
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Fire-and-forget submission of background tasks.
///
/// Implementations must not run the task inline on the caller: callers rely
/// on `execute` returning before the task makes progress.
pub trait ExecutionService: Send + Sync + std::fmt::Debug + 'static {
    /// Submits a task for asynchronous execution.
    fn execute(&self, task: Task);
}

/// The default [`ExecutionService`] backed by Tokio.
///
/// Delegates to [`tokio::spawn`], so it must be used from within a Tokio
/// runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioExecutionService;

impl ExecutionService for TokioExecutionService {
    fn execute(&self, task: Task) {
        tokio::spawn(task);
    }
}
