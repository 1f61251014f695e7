//! Fan-out of framebuffers to the targets of a producer.
//!
//! Every live target gets its own lock on the framebuffer, and all of those
//! locks are taken before the first target is notified. If locking and
//! notifying were interleaved, an early consumer could finish and unlock
//! before later ones were locked, dropping the retain count to zero and
//! recycling the framebuffer while it is still needed downstream.

use tracing::trace;

use super::target_registry::{LiveTarget, TargetRegistry};
use crate::framebuffer::SharedFramebuffer;

/// Hands a freshly produced framebuffer to every live target.
///
/// With no live targets the framebuffer is locked and unlocked once, which
/// returns an otherwise unreferenced framebuffer to its pool.
pub fn distribute(targets: &TargetRegistry, buffer: SharedFramebuffer) {
    let live = targets.live_targets();
    trace!(targets = live.len(), "Distributing framebuffer");

    if live.is_empty() {
        buffer.lock();
        buffer.unlock();
        return;
    }

    for _ in &live {
        buffer.lock();
    }
    notify(live, &buffer);
}

/// Passes on a framebuffer the caller holds exactly one lock on.
///
/// Locks once per live target, releases the caller's own lock, then
/// notifies. The net retain count is unchanged once every target has
/// unlocked.
pub fn forward(targets: &TargetRegistry, buffer: SharedFramebuffer) {
    let live = targets.live_targets();
    trace!(targets = live.len(), "Forwarding framebuffer");

    for _ in &live {
        buffer.lock();
    }
    buffer.unlock();
    notify(live, &buffer);
}

fn notify(live: Vec<LiveTarget>, buffer: &SharedFramebuffer) {
    for target in live {
        target
            .consumer
            .on_buffer_available(buffer.clone(), target.slot);
    }
}
