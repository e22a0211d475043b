//! Periodic submission of [`Job::CheckForNewBlogs`].
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::Job;
use crate::queue::JobQueue;

/// Enqueues a sweep job on a fixed period.
#[derive(Debug)]
pub struct Sweeper {
    queue: Arc<dyn JobQueue>,
    period: Duration,
}

impl Sweeper {
    /// Create a sweeper firing every `period`. The first sweep happens one
    /// period after [`run`](Self::run) starts.
    #[must_use]
    pub fn new(queue: Arc<dyn JobQueue>, period: Duration) -> Self {
        Self { queue, period }
    }

    /// Enqueue sweeps until `shutdown` fires or the queue is closed.
    pub async fn run(self, mut shutdown: watch::Receiver<()>) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(interval_secs = self.period.as_secs(), "blog sweep started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.queue.enqueue(Job::CheckForNewBlogs) {
                        tracing::warn!(error = %e, "blog sweep stopped");
                        break;
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("blog sweep shutting down");
                    break;
                }
            }
        }
    }
}
