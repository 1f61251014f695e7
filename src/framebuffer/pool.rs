//! Size-keyed framebuffer cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::{debug, error, trace};
use uuid::Uuid;

use super::{Framebuffer, FramebufferSize};
use crate::config::PoolConfig;

/// A framebuffer handed out by a [`FramebufferPool`].
///
/// Fresh from the pool its retain count is zero. When an `unlock` brings the
/// count back to zero the framebuffer goes back into the pool's free list.
/// The pool itself only holds framebuffers that are free; one that is
/// dropped without ever being unlocked is simply gone.
#[derive(Debug)]
pub struct PooledFramebuffer {
    id: Uuid,
    size: FramebufferSize,
    retain_count: AtomicUsize,
    this: Weak<PooledFramebuffer>,
    pool: Weak<PoolShared>,
}

impl PooledFramebuffer {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn size(&self) -> FramebufferSize {
        self.size
    }

    pub fn retain_count(&self) -> usize {
        self.retain_count.load(Ordering::Acquire)
    }
}

impl Framebuffer for PooledFramebuffer {
    fn lock(&self) {
        self.retain_count.fetch_add(1, Ordering::AcqRel);
    }

    fn unlock(&self) {
        let previous =
            self.retain_count
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                    count.checked_sub(1)
                });

        match previous {
            Ok(1) => {
                // The pool may already be gone; then the buffer just dies with its last Arc.
                if let (Some(pool), Some(this)) = (self.pool.upgrade(), self.this.upgrade()) {
                    pool.return_to_cache(this);
                }
            }
            Ok(_) => {}
            Err(_) => error!(id = %self.id, "Unlocked framebuffer with retain count 0"),
        }
    }
}

impl Drop for PooledFramebuffer {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            pool.alive.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

#[derive(Debug)]
struct PoolShared {
    config: PoolConfig,
    alive: AtomicUsize,
    free: DashMap<FramebufferSize, Vec<Arc<PooledFramebuffer>>>,
}

impl PoolShared {
    fn return_to_cache(&self, framebuffer: Arc<PooledFramebuffer>) {
        let (id, size) = (framebuffer.id, framebuffer.size);
        let mut free = self.free.entry(size).or_default();
        if free.len() >= self.config.max_cached_per_size {
            trace!(%id, %size, "Free list full, releasing framebuffer");
            return;
        }
        free.push(framebuffer);
        trace!(%id, %size, "Framebuffer returned to pool");
    }
}

/// Hands out framebuffers by size and recycles them once fully unlocked.
///
/// Cloning shares the same cache.
#[derive(Clone, Debug)]
pub struct FramebufferPool {
    shared: Arc<PoolShared>,
}

impl FramebufferPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                config,
                alive: AtomicUsize::new(0),
                free: DashMap::new(),
            }),
        }
    }

    /// Returns a framebuffer of `size` with retain count zero, reusing a free
    /// one when available.
    pub fn fetch(&self, size: FramebufferSize) -> Arc<PooledFramebuffer> {
        let reused = self
            .shared
            .free
            .get_mut(&size)
            .and_then(|mut free| free.pop());

        if let Some(framebuffer) = reused {
            trace!(id = %framebuffer.id, %size, "Reusing cached framebuffer");
            return framebuffer;
        }

        let framebuffer = Arc::new_cyclic(|this| PooledFramebuffer {
            id: Uuid::new_v4(),
            size,
            retain_count: AtomicUsize::new(0),
            this: this.clone(),
            pool: Arc::downgrade(&self.shared),
        });
        self.shared.alive.fetch_add(1, Ordering::AcqRel);
        debug!(id = %framebuffer.id, %size, "Allocated framebuffer");
        framebuffer
    }

    /// Number of framebuffers from this pool that still exist, in use or cached.
    pub fn allocated_count(&self) -> usize {
        self.shared.alive.load(Ordering::Acquire)
    }

    /// Number of framebuffers sitting in free lists.
    pub fn cached_count(&self) -> usize {
        self.shared.free.iter().map(|free| free.len()).sum()
    }

    /// Releases every cached framebuffer. Framebuffers still in use are untouched.
    pub fn purge(&self) {
        let mut purged = 0;
        for mut free in self.shared.free.iter_mut() {
            purged += free.len();
            free.clear();
        }
        debug!(purged, "Purged framebuffer pool");
    }
}
