//! Shared application state handed to every handler.
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use inkpost_domain::Store;
use inkpost_notify::{Job, JobQueue, MailSender};
use salvo::Depot;

use crate::error::ApiError;

/// Collaborators shared by every request.
///
/// Injected into the depot with `affix_state`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence.
    pub store: Arc<dyn Store>,
    /// Notification job submission.
    pub queue: Arc<dyn JobQueue>,
    /// Mail delivery for the contact form.
    pub mailer: Arc<dyn MailSender>,
    /// Recipient of contact form mails.
    pub contact_to: String,
}

impl Debug for AppState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("queue", &self.queue)
            .field("contact_to", &self.contact_to)
            .finish()
    }
}

impl AppState {
    /// Create a new `AppState`.
    pub fn new(
        store: Arc<dyn Store>,
        queue: Arc<dyn JobQueue>,
        mailer: Arc<dyn MailSender>,
        contact_to: impl Into<String>,
    ) -> Self {
        Self {
            store,
            queue,
            mailer,
            contact_to: contact_to.into(),
        }
    }

    /// The state injected into `depot`.
    pub fn obtain(depot: &Depot) -> Result<Self, ApiError> {
        depot
            .obtain::<Self>()
            .cloned()
            .map_err(|_| ApiError::internal("application state is not injected"))
    }

    /// Submit `job`. A closed queue is logged and otherwise ignored.
    pub fn notify(&self, job: Job) {
        if let Err(e) = self.queue.enqueue(job) {
            tracing::error!(%job, error = %e, "failed to enqueue notification");
        }
    }
}
