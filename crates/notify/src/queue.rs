//! Job submission boundary between request handlers and the worker.
use std::fmt::{self, Debug, Formatter};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Job;

/// Failure to submit a job.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueueError {
    /// The consuming side is gone.
    #[error("job queue is closed")]
    Closed,
}

/// Fire-and-forget job submission.
///
/// `enqueue` never waits for the job to run and returns no receipt.
pub trait JobQueue: Send + Sync + Debug + 'static {
    /// Submit `job`.
    fn enqueue(&self, job: Job) -> Result<(), QueueError>;
}

/// Create a queue backed by an unbounded channel, and its receiving half.
#[must_use]
pub fn channel() -> (ChannelQueue, JobReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelQueue { tx }, JobReceiver { rx })
}

/// Sending half of [`channel`].
#[derive(Clone, Debug)]
pub struct ChannelQueue {
    tx: UnboundedSender<Job>,
}

impl JobQueue for ChannelQueue {
    fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        self.tx.send(job).map_err(|_| QueueError::Closed)?;
        tracing::debug!(%job, "job enqueued");
        Ok(())
    }
}

/// Receiving half of [`channel`], consumed by the [`Worker`](crate::Worker).
#[derive(Debug)]
pub struct JobReceiver {
    rx: UnboundedReceiver<Job>,
}

impl JobReceiver {
    /// Next job, or `None` once every [`ChannelQueue`] is dropped.
    pub async fn recv(&mut self) -> Option<Job> {
        self.rx.recv().await
    }

    /// Stop accepting jobs. Jobs already queued can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// Records submitted jobs without running them.
#[derive(Default)]
pub struct MemoryQueue {
    jobs: Mutex<Vec<Job>>,
}

impl Debug for MemoryQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryQueue").field("jobs", &self.jobs.lock().len()).finish()
    }
}

impl MemoryQueue {
    /// Create an empty `MemoryQueue`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs submitted so far, oldest first.
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().clone()
    }

    /// Remove and return every recorded job.
    pub fn take(&self) -> Vec<Job> {
        std::mem::take(&mut *self.jobs.lock())
    }
}

impl JobQueue for MemoryQueue {
    fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        self.jobs.lock().push(job);
        Ok(())
    }
}
