use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::traits::ImageConsumer;
use crate::framebuffer::SharedFramebuffer;

/// The most recent framebuffer a producer emitted, kept for priming newly
/// attached consumers.
///
/// Holds one lock on the stored framebuffer so its pool cannot recycle it
/// while it may still be resent. Replacing or clearing the frame releases
/// that lock.
#[derive(Default)]
pub struct LastFrame {
    frame: Mutex<Option<SharedFramebuffer>>,
}

impl LastFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers `buffer`, releasing the previously stored frame.
    pub fn store(&self, buffer: &SharedFramebuffer) {
        buffer.lock();
        let previous = self.frame.lock().replace(buffer.clone());
        if let Some(previous) = previous {
            previous.unlock();
        }
    }

    /// Sends the stored frame to `consumer` on `slot`, locked once for it.
    /// Returns whether there was a frame to send.
    pub fn resend(&self, consumer: &Arc<dyn ImageConsumer>, slot: usize) -> bool {
        let frame = {
            let guard = self.frame.lock();
            let Some(frame) = guard.as_ref() else {
                return false;
            };
            // Locked under the mutex so a concurrent `store` cannot release it first.
            frame.lock();
            frame.clone()
        };
        trace!(slot, "Resending last frame");
        consumer.on_buffer_available(frame, slot);
        true
    }

    pub fn get(&self) -> Option<SharedFramebuffer> {
        self.frame.lock().clone()
    }

    /// Forgets the stored frame and releases its lock.
    pub fn clear(&self) {
        let previous = self.frame.lock().take();
        if let Some(previous) = previous {
            previous.unlock();
        }
    }
}

impl Drop for LastFrame {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.get_mut().take() {
            frame.unlock();
        }
    }
}
