//! Ready-made graph nodes.
//!
//! - [`Relay`] - One input, unlimited fan-out, optional observer
//! - [`FrameSource`] - Produces pool framebuffers on an execution context
//! - [`FrameSink`] - Terminal consumer that counts and releases what it receives

pub mod frame_sink;
pub mod frame_source;
pub mod relay;

pub use frame_sink::{FrameCallback, FrameSink};
pub use frame_source::FrameSource;
pub use relay::{FrameObserver, Relay};
