use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::context::ExecutionContext;
use crate::framebuffer::{FramebufferPool, FramebufferSize, SharedFramebuffer};
use crate::pipeline::{ImageConsumer, ImageProducer, LastFrame, TargetRegistry};

/// A producer that emits pool framebuffers of a fixed size.
///
/// Each production step runs on the source's execution context: it fetches a
/// framebuffer, remembers it as the last frame and distributes it. Priming a
/// newly attached consumer runs on the same context, so it is ordered with
/// respect to production.
pub struct FrameSource {
    targets: TargetRegistry,
    last_frame: Arc<LastFrame>,
    pool: FramebufferPool,
    size: FramebufferSize,
    context: Arc<dyn ExecutionContext>,
    frames_produced: AtomicU64,
}

impl FrameSource {
    pub fn new(
        pool: FramebufferPool,
        size: FramebufferSize,
        context: Arc<dyn ExecutionContext>,
    ) -> Self {
        Self {
            targets: TargetRegistry::new(),
            last_frame: Arc::new(LastFrame::new()),
            pool,
            size,
            context,
            frames_produced: AtomicU64::new(0),
        }
    }

    /// Queues one production step and returns.
    pub fn produce(self: &Arc<Self>) {
        let this = self.clone();
        self.context.run_async(Box::new(move || this.produce_frame()));
    }

    /// Runs one production step and waits for it, including delivery.
    pub fn produce_sync(self: &Arc<Self>) {
        let this = self.clone();
        self.context.run_sync(Box::new(move || this.produce_frame()));
    }

    pub fn frames_produced(&self) -> u64 {
        self.frames_produced.load(Ordering::Acquire)
    }

    pub fn size(&self) -> FramebufferSize {
        self.size
    }

    fn produce_frame(&self) {
        let framebuffer: SharedFramebuffer = self.pool.fetch(self.size);
        self.last_frame.store(&framebuffer);
        let index = self.frames_produced.fetch_add(1, Ordering::AcqRel);
        trace!(index, size = %self.size, "Produced frame");
        self.distribute(framebuffer);
    }
}

impl ImageProducer for FrameSource {
    fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    fn resend_last_frame(&self, target: &Arc<dyn ImageConsumer>, slot: usize) {
        let last_frame = self.last_frame.clone();
        let target = target.clone();
        self.context.run_sync(Box::new(move || {
            last_frame.resend(&target, slot);
        }));
    }
}
