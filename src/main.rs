use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, trace};

use image_graph::config::PipelineConfig;
use image_graph::context::{ExecutionContext, SerialQueue};
use image_graph::framebuffer::FramebufferPool;
use image_graph::pipeline::{FrameSink, FrameSource, ImageProducer, ImageProducerExt, Relay};

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run() {
        error!("Pipeline error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => PipelineConfig::load(&path)?,
        None => PipelineConfig::default(),
    };
    info!(
        size = %config.frame_size,
        frames = config.frames_per_run,
        sinks = config.sink_count,
        "Starting image graph"
    );

    let pool = FramebufferPool::new(config.pool.clone());
    let queue: Arc<dyn ExecutionContext> = Arc::new(SerialQueue::new("image-graph.source")?);

    // Source -> Relay (tap) -> Sinks
    let source = Arc::new(FrameSource::new(pool.clone(), config.frame_size, queue.clone()));
    let relay = source.add_target(&Arc::new(Relay::with_observer(|framebuffer| {
        trace!(?framebuffer, "Frame passed the tap");
    })));
    let mut sinks: Vec<Arc<FrameSink>> = (0..config.sink_count)
        .map(|_| relay.add_target(&Arc::new(FrameSink::new(1))))
        .collect();

    for _ in 0..config.frames_per_run {
        source.produce();
    }
    // Everything queued before this has run once it returns.
    queue.run_sync(Box::new(|| {}));
    info!(
        produced = source.frames_produced(),
        allocated = pool.allocated_count(),
        cached = pool.cached_count(),
        "First run finished"
    );

    // A sink attached to the running graph starts with the latest frame.
    let late = relay.add_target(&Arc::new(FrameSink::new(1)));
    info!(primed = late.frames_received(), "Attached late sink");

    // Dropping a sink detaches it; the relay prunes it on the next frame.
    if let Some(dropped) = sinks.pop() {
        info!(received = dropped.frames_received(), "Dropping a sink");
    }

    for _ in 0..config.frames_per_run {
        source.produce();
    }
    source.produce_sync();

    for (index, sink) in sinks.iter().chain(std::iter::once(&late)).enumerate() {
        info!(index, received = sink.frames_received(), "Sink finished");
    }
    info!(
        produced = source.frames_produced(),
        relay_targets = relay.targets().len(),
        allocated = pool.allocated_count(),
        cached = pool.cached_count(),
        "Second run finished"
    );

    Ok(())
}
