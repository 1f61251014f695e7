//! Recording doubles shared by the pipeline tests.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::framebuffer::{Framebuffer, SharedFramebuffer};
use crate::pipeline::{ImageConsumer, ImageProducer, LastFrame, SourceRegistry, TargetRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Lock(&'static str),
    Unlock(&'static str),
    Notify(&'static str, usize),
}

/// Ordered log of lock, unlock and delivery events across buffers and consumers.
pub type Journal = Arc<Mutex<Vec<Event>>>;

pub fn new_journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// A framebuffer that journals every lock and unlock. Its count may go
/// negative so tests can see an unbalanced unlock.
#[derive(Debug)]
pub struct RecordingFramebuffer {
    name: &'static str,
    retain_count: AtomicI64,
    locks: AtomicUsize,
    unlocks: AtomicUsize,
    journal: Journal,
}

impl RecordingFramebuffer {
    pub fn new(name: &'static str, journal: Journal) -> Self {
        Self {
            name,
            retain_count: AtomicI64::new(0),
            locks: AtomicUsize::new(0),
            unlocks: AtomicUsize::new(0),
            journal,
        }
    }

    pub fn retain_count(&self) -> i64 {
        self.retain_count.load(Ordering::SeqCst)
    }

    pub fn locks(&self) -> usize {
        self.locks.load(Ordering::SeqCst)
    }

    pub fn unlocks(&self) -> usize {
        self.unlocks.load(Ordering::SeqCst)
    }
}

impl Framebuffer for RecordingFramebuffer {
    fn lock(&self) {
        self.journal.lock().unwrap().push(Event::Lock(self.name));
        self.locks.fetch_add(1, Ordering::SeqCst);
        self.retain_count.fetch_add(1, Ordering::SeqCst);
    }

    fn unlock(&self) {
        self.journal.lock().unwrap().push(Event::Unlock(self.name));
        self.unlocks.fetch_add(1, Ordering::SeqCst);
        self.retain_count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A consumer that journals each delivery, keeps the framebuffers it got and
/// unlocks them right away.
pub struct RecordingConsumer {
    name: &'static str,
    maximum_inputs: usize,
    sources: SourceRegistry,
    received: Mutex<Vec<(SharedFramebuffer, usize)>>,
    journal: Journal,
}

impl RecordingConsumer {
    pub fn new(name: &'static str, maximum_inputs: usize, journal: Journal) -> Self {
        Self {
            name,
            maximum_inputs,
            sources: SourceRegistry::new(),
            received: Mutex::new(Vec::new()),
            journal,
        }
    }

    pub fn received(&self) -> Vec<(SharedFramebuffer, usize)> {
        self.received.lock().unwrap().clone()
    }
}

impl ImageConsumer for RecordingConsumer {
    fn maximum_inputs(&self) -> usize {
        self.maximum_inputs
    }

    fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    fn on_buffer_available(&self, buffer: SharedFramebuffer, slot: usize) {
        self.journal
            .lock()
            .unwrap()
            .push(Event::Notify(self.name, slot));
        self.received.lock().unwrap().push((buffer.clone(), slot));
        buffer.unlock();
    }
}

/// A producer driven by hand: `produce` remembers the frame, then distributes it.
#[derive(Default)]
pub struct TestProducer {
    targets: TargetRegistry,
    last_frame: LastFrame,
}

impl TestProducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn produce(&self, buffer: SharedFramebuffer) {
        self.last_frame.store(&buffer);
        self.distribute(buffer);
    }

    pub fn forget_last_frame(&self) {
        self.last_frame.clear();
    }
}

impl ImageProducer for TestProducer {
    fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    fn resend_last_frame(&self, target: &Arc<dyn ImageConsumer>, slot: usize) {
        self.last_frame.resend(target, slot);
    }
}
