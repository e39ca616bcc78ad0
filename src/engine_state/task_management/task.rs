//! # Task System Core Traits
//!
//! This module defines the two halves of a unit of background work.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the thread that owns the `TaskManager`
//! 5. The result can spawn follow-up tasks, which are published in turn
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `TaskResult` must be `Send` to be transferred back
//! - Shared state reached by a task goes through `MtResource`

/// A unit of work executed on a worker thread.
///
/// Tasks own everything they need, typically `MtResource` handles and plain
/// values such as coordinates. They must not assume the state they point at is
/// unchanged since they were published.
pub trait Task: Send {
    /// Performs the work.
    ///
    /// Runs on a worker thread. Errors are handled inside the task and
    /// reported through the returned result.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The outcome of a `Task`, handled back on the owning thread.
pub trait TaskResult: Send {
    /// Consumes the result.
    ///
    /// # Returns
    /// Follow-up tasks to publish (can be empty).
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>>;
}
