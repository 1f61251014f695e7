//! A dedicated worker thread fed through a channel.

use std::thread::{self, JoinHandle, ThreadId};

use anyhow::{Context, Result};
use crossbeam::channel::{self, Sender};
use tracing::{debug, warn};

use super::{ExecutionContext, Job};

/// Serializes jobs onto one named worker thread.
///
/// `run_sync` from the worker thread itself runs the job inline, so a job may
/// submit synchronous work to its own queue without deadlocking.
pub struct SerialQueue {
    label: String,
    sender: Option<Sender<Job>>,
    worker_id: ThreadId,
    worker: Option<JoinHandle<()>>,
}

impl SerialQueue {
    pub fn new(label: &str) -> Result<Self> {
        let (sender, receiver) = channel::unbounded::<Job>();

        let thread_label = label.to_string();
        let worker = thread::Builder::new()
            .name(label.to_string())
            .spawn(move || {
                debug!("Serial queue {} started", thread_label);
                for job in receiver {
                    job();
                }
                debug!("Serial queue {} stopped", thread_label);
            })
            .with_context(|| format!("Failed to spawn serial queue {label}"))?;

        Ok(Self {
            label: label.to_string(),
            sender: Some(sender),
            worker_id: worker.thread().id(),
            worker: Some(worker),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the caller is running on this queue's worker thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    fn submit(&self, job: Job) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        if sender.send(job).is_err() {
            warn!("Serial queue {} is gone, dropping job", self.label);
            return false;
        }
        true
    }
}

impl ExecutionContext for SerialQueue {
    fn run_sync(&self, job: Job) {
        if self.is_current() {
            job();
            return;
        }

        let (done_tx, done_rx) = channel::bounded::<()>(1);
        let submitted = self.submit(Box::new(move || {
            job();
            let _ = done_tx.send(());
        }));

        // A panicking job drops `done_tx`, which also ends the wait.
        if submitted {
            let _ = done_rx.recv();
        }
    }

    fn run_async(&self, job: Job) {
        self.submit(job);
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() != thread::current().id() && worker.join().is_err() {
                warn!("Serial queue {} worker panicked", self.label);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_jobs_run_in_order() {
        let queue = SerialQueue::new("test.order").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..16 {
            let seen = seen.clone();
            queue.run_async(Box::new(move || seen.lock().unwrap().push(i)));
        }
        queue.run_sync(Box::new(|| {}));

        assert_eq!(*seen.lock().unwrap(), (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_run_sync_waits() {
        let queue = SerialQueue::new("test.sync").unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        queue.run_sync(Box::new(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            c.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_run_sync() {
        let queue = Arc::new(SerialQueue::new("test.reentrant").unwrap());
        let counter = Arc::new(AtomicUsize::new(0));

        let inner_queue = queue.clone();
        let c = counter.clone();
        queue.run_sync(Box::new(move || {
            assert!(inner_queue.is_current());
            let c = c.clone();
            inner_queue.run_sync(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!queue.is_current());
    }

    #[test]
    fn test_drop_drains_pending_jobs() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let queue = SerialQueue::new("test.drain").unwrap();
            for _ in 0..8 {
                let c = counter.clone();
                queue.run_async(Box::new(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }
}
