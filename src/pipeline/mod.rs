//! The image-processing graph.
//!
//! Producers hold weak edges to their consumers and consumers hold strong
//! edges to their producers, so a graph stays alive from its sinks upward
//! and a dropped consumer simply stops receiving frames.

pub mod connection;
pub mod distribute;
pub mod error;
pub mod last_frame;
pub mod node;
pub mod source_registry;
pub mod target_registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::{ImageProducerExt, connect, disconnect, try_connect};
pub use error::ConnectError;
pub use last_frame::LastFrame;
pub use node::{FrameSink, FrameSource, Relay};
pub use source_registry::SourceRegistry;
pub use target_registry::{LiveTarget, TargetRegistry};
pub use traits::{ImageConsumer, ImageProducer};
