use super::{ExecutionContext, Job};

/// Runs every job on the calling thread. Meant for tests and single-threaded tools.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineContext;

impl ExecutionContext for InlineContext {
    fn run_sync(&self, job: Job) {
        job();
    }

    fn run_async(&self, job: Job) {
        job();
    }
}
