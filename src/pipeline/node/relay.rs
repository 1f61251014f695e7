use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::framebuffer::SharedFramebuffer;
use crate::pipeline::distribute;
use crate::pipeline::{ImageConsumer, ImageProducer, SourceRegistry, TargetRegistry};

/// Called with each framebuffer that reaches a [`Relay`], before it is forwarded.
pub type FrameObserver = Box<dyn Fn(&SharedFramebuffer) + Send + Sync>;

/// A one-input passthrough that forwards every framebuffer to all of its targets.
///
/// Useful for tapping a stream (with an observer) or for giving one stream
/// several independent fan-out points. Forwarding follows the same lock
/// discipline as distribution, so a relay never changes the retain/release
/// balance set up by the producer in front of it.
pub struct Relay {
    sources: SourceRegistry,
    targets: TargetRegistry,
    observer: Option<FrameObserver>,
    prevent_relay: AtomicBool,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            sources: SourceRegistry::new(),
            targets: TargetRegistry::new(),
            observer: None,
            prevent_relay: AtomicBool::new(false),
        }
    }

    pub fn with_observer<F>(observer: F) -> Self
    where
        F: Fn(&SharedFramebuffer) + Send + Sync + 'static,
    {
        Self {
            observer: Some(Box::new(observer)),
            ..Self::new()
        }
    }

    /// While set, incoming framebuffers are observed and released but not forwarded.
    pub fn set_prevent_relay(&self, prevent: bool) {
        self.prevent_relay.store(prevent, Ordering::Release);
    }

    pub fn is_relay_prevented(&self) -> bool {
        self.prevent_relay.load(Ordering::Acquire)
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageConsumer for Relay {
    fn maximum_inputs(&self) -> usize {
        1
    }

    fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    fn on_buffer_available(&self, buffer: SharedFramebuffer, _slot: usize) {
        if let Some(observer) = &self.observer {
            observer(&buffer);
        }

        if self.is_relay_prevented() {
            buffer.unlock();
            return;
        }

        distribute::forward(&self.targets, buffer);
    }
}

impl ImageProducer for Relay {
    fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    /// The relay keeps no frame of its own. Its upstream's last frame is what
    /// it would have forwarded, so the upstream delivers it to `target` directly.
    /// The observer already saw that frame when it passed through and is not
    /// called again. A prevented relay primes nothing.
    fn resend_last_frame(&self, target: &Arc<dyn ImageConsumer>, slot: usize) {
        if self.is_relay_prevented() {
            return;
        }
        if let Some(upstream) = self.sources.get(0) {
            upstream.resend_last_frame(target, slot);
        }
    }
}
