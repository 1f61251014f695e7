//! Object-safe node capabilities.
//!
//! A node joins the graph by implementing one or both of these traits:
//!
//! - [`ImageProducer`] - Emits framebuffers to the consumers in its [`TargetRegistry`]
//! - [`ImageConsumer`] - Accepts framebuffers on a fixed number of input slots
//!
//! Connection, disconnection and distribution are provided on top of these
//! minimal contracts (see [`connection`](super::connection) and
//! [`distribute`](super::distribute)), so node types only implement the
//! accessors and their own delivery logic.

use std::sync::Arc;

use super::distribute;
use super::source_registry::SourceRegistry;
use super::target_registry::TargetRegistry;
use crate::framebuffer::SharedFramebuffer;

/// Something that emits framebuffers downstream.
pub trait ImageProducer: Send + Sync {
    /// Outgoing edges of this node.
    fn targets(&self) -> &TargetRegistry;

    /// Delivers the most recently produced framebuffer to `target` on `slot`,
    /// locked once on the consumer's behalf. Does nothing if there is no frame yet.
    fn resend_last_frame(&self, target: &Arc<dyn ImageConsumer>, slot: usize);

    /// Hands a finished framebuffer to every live target.
    fn distribute(&self, buffer: SharedFramebuffer) {
        distribute::distribute(self.targets(), buffer);
    }

    /// Disconnects this node from all of its targets, clearing both sides of
    /// every edge.
    fn remove_all_targets(&self) {
        super::connection::remove_all_targets(self);
    }

    /// Whether `self` and `other` are the same node.
    fn is_same_producer(&self, other: &dyn ImageProducer) -> bool {
        std::ptr::addr_eq(self, other)
    }
}

/// Something that accepts framebuffers on numbered input slots.
pub trait ImageConsumer: Send + Sync {
    /// Number of input slots. Must not change over the node's lifetime.
    fn maximum_inputs(&self) -> usize;

    /// Incoming edges of this node.
    fn sources(&self) -> &SourceRegistry;

    /// Called with a framebuffer that has been locked once for this consumer.
    /// The consumer must `unlock` it exactly once when done, including when it
    /// forwards the framebuffer onward.
    fn on_buffer_available(&self, buffer: SharedFramebuffer, slot: usize);
}
