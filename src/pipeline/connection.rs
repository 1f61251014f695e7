//! Wiring producers to consumers.
//!
//! Both sides of an edge are written together: the consumer's
//! [`SourceRegistry`](super::SourceRegistry) slot and the producer's
//! [`TargetRegistry`] entry. Right after a new edge exists the producer
//! resends its last frame over it, so a consumer attached to a running
//! pipeline has something to show before the next frame is produced.
//!
//! # Usage
//!
//! ```ignore
//! let source = Arc::new(FrameSource::new(pool, size, queue));
//! let relay = Arc::new(Relay::new());
//! let preview = Arc::new(FrameSink::new(1));
//!
//! // Fluent: each call returns its destination.
//! source.add_target(&relay).add_target(&preview);
//!
//! // Or in one go.
//! let preview = connect_chain!(source => relay => preview);
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use super::error::ConnectError;
use super::traits::{ImageConsumer, ImageProducer};

/// Connects `source` to `destination` and returns `destination`.
///
/// With `at_index` the exact slot is used, replacing whatever producer held
/// it. Without, the lowest free slot is used; if there is none the refusal
/// is logged and the graph is left unchanged.
///
/// # Panics
/// If `at_index` is not below `destination.maximum_inputs()`.
pub fn connect<S, D>(source: &Arc<S>, destination: &Arc<D>, at_index: Option<usize>) -> Arc<D>
where
    S: ImageProducer + 'static,
    D: ImageConsumer + 'static,
{
    if let Err(err) = try_connect(source, destination, at_index) {
        warn!("Refusing connection: {}", err);
    }
    destination.clone()
}

/// Like [`connect`], but reports a refused connection and returns the slot used.
///
/// # Panics
/// If `at_index` is not below `destination.maximum_inputs()`. Nothing has
/// been modified at that point.
pub fn try_connect<S, D>(
    source: &Arc<S>,
    destination: &Arc<D>,
    at_index: Option<usize>,
) -> Result<usize, ConnectError>
where
    S: ImageProducer + 'static,
    D: ImageConsumer + 'static,
{
    let producer: Arc<dyn ImageProducer> = source.clone();
    let consumer: Arc<dyn ImageConsumer> = destination.clone();
    let maximum_inputs = consumer.maximum_inputs();

    let slot = match at_index {
        Some(slot) => {
            let previous = consumer
                .sources()
                .insert(producer, slot, maximum_inputs);
            // The displaced producer must stop delivering to this slot.
            if let Some(previous) = previous {
                previous.targets().remove_edge(&consumer, slot);
            }
            slot
        }
        None => consumer
            .sources()
            .append(producer, maximum_inputs)
            .ok_or(ConnectError::NoFreeSlot { maximum_inputs })?,
    };

    source.targets().append(&consumer, slot);
    debug!(slot, maximum_inputs, "Connected producer to consumer");

    source.resend_last_frame(&consumer, slot);
    Ok(slot)
}

/// Removes every edge between `source` and `destination`, both sides together.
pub fn disconnect<S, D>(source: &Arc<S>, destination: &Arc<D>)
where
    S: ImageProducer + 'static,
    D: ImageConsumer + 'static,
{
    let consumer: Arc<dyn ImageConsumer> = destination.clone();
    let slots = source.targets().remove_consumer(&consumer);
    for &slot in &slots {
        destination
            .sources()
            .release_slot(slot, source.as_ref());
    }
    debug!(?slots, "Disconnected producer from consumer");
}

/// Clears every live edge of `producer`, both sides together.
pub(crate) fn remove_all_targets<P: ImageProducer + ?Sized>(producer: &P) {
    let removed = producer.targets().take_all();
    for target in &removed {
        target.consumer.sources().release_slot(target.slot, producer);
    }
    debug!(count = removed.len(), "Removed all targets");
}

/// Fluent graph construction on shared producers.
pub trait ImageProducerExt {
    /// Connects to the lowest free slot of `destination` and returns it.
    fn add_target<D: ImageConsumer + 'static>(&self, destination: &Arc<D>) -> Arc<D>;

    /// Connects to slot `at_index` of `destination` and returns it.
    fn add_target_at<D: ImageConsumer + 'static>(
        &self,
        destination: &Arc<D>,
        at_index: usize,
    ) -> Arc<D>;
}

impl<S: ImageProducer + 'static> ImageProducerExt for Arc<S> {
    fn add_target<D: ImageConsumer + 'static>(&self, destination: &Arc<D>) -> Arc<D> {
        connect(self, destination, None)
    }

    fn add_target_at<D: ImageConsumer + 'static>(
        &self,
        destination: &Arc<D>,
        at_index: usize,
    ) -> Arc<D> {
        connect(self, destination, Some(at_index))
    }
}

/// Connects a sequence of nodes, each to the lowest free slot of the next.
/// Evaluates to the last node.
///
/// # Syntax
///
/// ```ignore
/// connect_chain!(source => stage1 => stage2 => sink)
/// ```
///
/// Every operand is an `Arc` to a node; the ones in the middle must be both
/// producers and consumers.
#[macro_export]
macro_rules! connect_chain {
    ($source:expr => $next:expr $(=> $rest:expr)*) => {{
        let next = $crate::pipeline::connect(&$source, &$next, None);
        $crate::connect_chain!(next $(=> $rest)*)
    }};

    ($last:expr) => {{
        $last
    }};
}
