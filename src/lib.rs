//! A real-time image-processing graph.
//!
//! Producers push reference-counted framebuffers to any number of consumers,
//! each on a numbered input slot. Framebuffers come from a recycling pool and
//! go back to it once every consumer downstream has released them.
//!
//! - [`framebuffer`] - The lock/unlock contract and the recycling pool
//! - [`pipeline`] - Node traits, edge bookkeeping, connection and distribution
//! - [`context`] - Where node work runs
//! - [`config`] - JSON configuration for the pool and the demo pipeline

pub mod config;
pub mod context;
pub mod framebuffer;
pub mod pipeline;
