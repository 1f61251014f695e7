//! Configuration for the demo pipeline and the framebuffer pool.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::framebuffer::FramebufferSize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Free framebuffers kept per size; extra ones are released instead of cached.
    pub max_cached_per_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_cached_per_size: 8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub frame_size: FramebufferSize,
    pub frames_per_run: u32,
    pub sink_count: usize,
    pub pool: PoolConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_size: FramebufferSize::new(1280, 720),
            frames_per_run: 30,
            sink_count: 2,
            pool: PoolConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads a JSON config. Missing fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse pipeline config")
    }
}
