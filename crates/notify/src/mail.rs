//! Outbound mail contract and the bundled senders.
use std::collections::HashSet;
use std::fmt::{self, Debug, Formatter};

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// A plain text email.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mail {
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Sender address.
    pub from: String,
    /// Recipient addresses.
    pub to: Vec<String>,
}

impl Mail {
    /// Create a mail without recipients.
    pub fn new(subject: impl Into<String>, body: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            from: from.into(),
            to: Vec::new(),
        }
    }

    /// Adds a recipient and returns `Self`.
    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }
}

/// Failure reported by a [`MailSender`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MailError {
    /// The mail names no recipient.
    #[error("mail has no recipients")]
    NoRecipients,
    /// The transport refused or lost the mail.
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Delivers mails.
#[async_trait]
pub trait MailSender: Send + Sync + 'static {
    /// Deliver `mail` to every recipient.
    async fn send(&self, mail: Mail) -> Result<(), MailError>;
}

/// Writes every mail to the log instead of delivering it.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogMailer;

impl LogMailer {
    /// Create a new `LogMailer`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailSender for LogMailer {
    async fn send(&self, mail: Mail) -> Result<(), MailError> {
        if mail.to.is_empty() {
            return Err(MailError::NoRecipients);
        }
        tracing::info!(
            from = %mail.from,
            to = ?mail.to,
            subject = %mail.subject,
            "mail sent"
        );
        tracing::debug!(body = %mail.body, "mail body");
        Ok(())
    }
}

/// Keeps sent mails in memory.
///
/// Delivery can be made to fail for every mail or for given recipients.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Mail>>,
    fail_all: Mutex<bool>,
    failing: Mutex<HashSet<String>>,
}

impl Debug for MemoryMailer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryMailer")
            .field("sent", &self.sent.lock().len())
            .finish()
    }
}

impl MemoryMailer {
    /// Create a new `MemoryMailer`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail.
    pub fn fail_all(&self) {
        *self.fail_all.lock() = true;
    }

    /// Make sends to `address` fail.
    pub fn fail_for(&self, address: impl Into<String>) {
        self.failing.lock().insert(address.into());
    }

    /// Mails delivered so far, oldest first.
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().clone()
    }

    /// Mails delivered to `address`.
    pub fn sent_to(&self, address: &str) -> Vec<Mail> {
        self.sent
            .lock()
            .iter()
            .filter(|mail| mail.to.iter().any(|to| to == address))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MailSender for MemoryMailer {
    async fn send(&self, mail: Mail) -> Result<(), MailError> {
        if mail.to.is_empty() {
            return Err(MailError::NoRecipients);
        }
        if *self.fail_all.lock() {
            return Err(MailError::Transport("connection refused".into()));
        }
        {
            let failing = self.failing.lock();
            if let Some(address) = mail.to.iter().find(|to| failing.contains(*to)) {
                return Err(MailError::Transport(format!("recipient {address} rejected")));
            }
        }
        self.sent.lock().push(mail);
        Ok(())
    }
}
