//! Background task draining the job queue.
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::Job;
use crate::notifier::Notifier;
use crate::queue::JobReceiver;

/// Runs every received job on its own task and logs the outcome.
#[derive(Debug)]
pub struct Worker {
    notifier: Notifier,
    receiver: JobReceiver,
}

impl Worker {
    /// Create a worker consuming `receiver`.
    #[must_use]
    pub fn new(notifier: Notifier, receiver: JobReceiver) -> Self {
        Self { notifier, receiver }
    }

    /// Process jobs until `shutdown` fires or every queue handle is dropped.
    ///
    /// On shutdown the queue is closed and every job it already accepted is
    /// still run. All jobs are awaited before returning.
    pub async fn run(mut self, mut shutdown: watch::Receiver<()>) {
        tracing::info!("notification worker started");
        let mut running = JoinSet::new();
        loop {
            tokio::select! {
                job = self.receiver.recv() => {
                    let Some(job) = job else {
                        break;
                    };
                    self.spawn(&mut running, job);
                }
                Some(finished) = running.join_next() => {
                    if let Err(e) = finished {
                        tracing::error!(error = %e, "job panicked");
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("notification worker shutting down");
                    self.receiver.close();
                    while let Some(job) = self.receiver.recv().await {
                        self.spawn(&mut running, job);
                    }
                    break;
                }
            }
        }
        while let Some(finished) = running.join_next().await {
            if let Err(e) = finished {
                tracing::error!(error = %e, "job panicked");
            }
        }
        tracing::info!("notification worker stopped");
    }

    fn spawn(&self, running: &mut JoinSet<()>, job: Job) {
        let notifier = self.notifier.clone();
        running.spawn(async move {
            let outcome = notifier.run(job).await;
            tracing::info!(%job, %outcome, "job finished");
        });
    }
}
