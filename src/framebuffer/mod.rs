//! Reference-counted image buffers.
//!
//! The graph never looks at pixels. All it needs from a buffer is a retain
//! count it can raise before announcing the buffer and that consumers lower
//! once they are done with it:
//!
//! - [`Framebuffer`] - The `lock`/`unlock` contract every buffer handle implements
//! - [`SharedFramebuffer`] - The handle type passed along graph edges
//! - [`FramebufferPool`] / [`PooledFramebuffer`] - A size-keyed cache that hands
//!   out buffers and takes them back when their retain count returns to zero

pub mod pool;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use pool::{FramebufferPool, PooledFramebuffer};

/// Pixel dimensions of a framebuffer. Also the key buffers are cached under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FramebufferSize {
    pub width: u32,
    pub height: u32,
}

impl FramebufferSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for FramebufferSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An opaque, reference-counted image resource.
///
/// `lock` raises the retain count, `unlock` lowers it. The implementation
/// returns the buffer to wherever it came from exactly when the count drops
/// to zero. Both must be callable from any thread.
pub trait Framebuffer: Send + Sync + fmt::Debug {
    fn lock(&self);
    fn unlock(&self);
}

/// Handle passed along graph edges.
///
/// Cloning the `Arc` only keeps the memory alive; it says nothing about the
/// retain count. Whoever receives a buffer through
/// [`ImageConsumer::on_buffer_available`](crate::pipeline::ImageConsumer::on_buffer_available)
/// owns exactly one lock on it.
pub type SharedFramebuffer = Arc<dyn Framebuffer>;
