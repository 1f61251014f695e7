use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use crate::framebuffer::SharedFramebuffer;
use crate::pipeline::{ImageConsumer, SourceRegistry};

/// Called with each framebuffer a [`FrameSink`] receives and the slot it came in on.
pub type FrameCallback = Box<dyn Fn(&SharedFramebuffer, usize) + Send + Sync>;

/// A terminal consumer. Counts what arrives on each slot, runs an optional
/// callback, and releases the framebuffer.
pub struct FrameSink {
    sources: SourceRegistry,
    received: Vec<AtomicU64>,
    callback: Option<FrameCallback>,
}

impl FrameSink {
    pub fn new(maximum_inputs: usize) -> Self {
        Self {
            sources: SourceRegistry::new(),
            received: (0..maximum_inputs).map(|_| AtomicU64::new(0)).collect(),
            callback: None,
        }
    }

    pub fn with_callback<F>(maximum_inputs: usize, callback: F) -> Self
    where
        F: Fn(&SharedFramebuffer, usize) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
            ..Self::new(maximum_inputs)
        }
    }

    /// Total framebuffers received over all slots.
    pub fn frames_received(&self) -> u64 {
        self.received
            .iter()
            .map(|count| count.load(Ordering::Acquire))
            .sum()
    }

    pub fn frames_received_on(&self, slot: usize) -> u64 {
        self.received
            .get(slot)
            .map_or(0, |count| count.load(Ordering::Acquire))
    }
}

impl ImageConsumer for FrameSink {
    fn maximum_inputs(&self) -> usize {
        self.received.len()
    }

    fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    fn on_buffer_available(&self, buffer: SharedFramebuffer, slot: usize) {
        match self.received.get(slot) {
            Some(count) => {
                count.fetch_add(1, Ordering::AcqRel);
            }
            None => warn!(slot, "Framebuffer delivered to a slot this sink does not have"),
        }

        if let Some(callback) = &self.callback {
            callback(&buffer, slot);
        }
        buffer.unlock();
    }
}
