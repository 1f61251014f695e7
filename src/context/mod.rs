//! Serialized execution contexts.
//!
//! Everything that touches buffers for one pipeline runs on a single logical
//! context. Nodes receive their context at construction, so tests can hand
//! them an [`InlineContext`] while applications use a [`SerialQueue`].

pub mod inline;
pub mod serial_queue;

pub use inline::InlineContext;
pub use serial_queue::SerialQueue;

/// A unit of work submitted to an [`ExecutionContext`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs one at a time, in submission order.
pub trait ExecutionContext: Send + Sync {
    /// Runs `job` and returns once it has finished.
    fn run_sync(&self, job: Job);

    /// Queues `job` and returns immediately.
    fn run_async(&self, job: Job);
}
