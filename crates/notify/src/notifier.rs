//! Runs notification jobs against the store and the mail sender.
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use inkpost_domain::{CommentId, PostFilter, PostId, Store};
use thiserror::Error;

use crate::mail::{MailError, MailSender};
use crate::queue::{JobQueue, QueueError};
use crate::{Job, template};

/// Default sender address of notification mails.
pub const DEFAULT_MAIL_FROM: &str = "noreply@inkpost.local";

/// Why a job could not complete.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotifyError {
    /// A record the job needs is gone.
    #[error("{0} does not exist")]
    Missing(String),
    /// The store failed.
    #[error(transparent)]
    Store(#[from] inkpost_domain::Error),
    /// The mail sender failed.
    #[error(transparent)]
    Mail(#[from] MailError),
    /// A follow-up job could not be submitted.
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Executes [`Job`]s.
///
/// Every job reports its outcome as a human readable string; failures never
/// escape [`Notifier::run`].
#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn Store>,
    mailer: Arc<dyn MailSender>,
    queue: Arc<dyn JobQueue>,
    from: String,
    window: TimeDelta,
}

impl Debug for Notifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("queue", &self.queue)
            .field("from", &self.from)
            .field("window", &self.window)
            .finish()
    }
}

impl Notifier {
    /// Create a `Notifier` with a one hour sweep window.
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn MailSender>, queue: Arc<dyn JobQueue>) -> Self {
        Self {
            store,
            mailer,
            queue,
            from: DEFAULT_MAIL_FROM.into(),
            window: TimeDelta::hours(1),
        }
    }

    /// Sets the sender address and returns `Self`.
    #[must_use]
    pub fn mail_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    /// Sets how far back [`check_for_new_blogs`](Self::check_for_new_blogs) looks.
    #[must_use]
    pub fn window(mut self, window: TimeDelta) -> Self {
        self.window = window;
        self
    }

    /// Run `job` and describe the outcome.
    pub async fn run(&self, job: Job) -> String {
        match job {
            Job::CommentNotification { comment_id } => self.send_comment_notification(comment_id).await,
            Job::NewBlogNotification { blog_id } => self.send_new_blog_notification(blog_id).await,
            Job::CheckForNewBlogs => self.check_for_new_blogs(Utc::now()).await,
        }
    }

    /// Mail the post's author about `comment_id`, unless they wrote it.
    pub async fn send_comment_notification(&self, comment_id: CommentId) -> String {
        match self.try_comment_notification(comment_id).await {
            Ok(Some(email)) => format!("Comment notification email sent to {email}"),
            Ok(None) => "No notification needed - author commented on their own post".into(),
            Err(e) => format!("Failed to send comment notification: {e}"),
        }
    }

    async fn try_comment_notification(&self, comment_id: CommentId) -> Result<Option<String>, NotifyError> {
        let comment = self
            .store
            .comment(comment_id)
            .await?
            .ok_or_else(|| NotifyError::Missing(format!("comment {comment_id}")))?;
        let post = self
            .store
            .post(comment.post)
            .await?
            .ok_or_else(|| NotifyError::Missing(format!("blog {}", comment.post)))?;
        let Some(author) = self.store.user(post.author).await? else {
            return Ok(None);
        };
        if comment.user == Some(author.id) {
            return Ok(None);
        }
        let commenter = match comment.user {
            Some(id) => self.store.user(id).await?,
            None => None,
        };
        let mail = template::comment_notification(&self.from, &author, &post, commenter.as_ref(), &comment);
        self.mailer.send(mail).await?;
        Ok(Some(author.email))
    }

    /// Mail every subscriber other than the author about a published post.
    ///
    /// A failed recipient is logged and counted; the others are still mailed.
    pub async fn send_new_blog_notification(&self, blog_id: PostId) -> String {
        match self.try_new_blog_notification(blog_id).await {
            Ok(None) => "Blog is not published, no notifications sent".into(),
            Ok(Some((sent, 0))) => format!("New blog notification sent to {sent} users"),
            Ok(Some((sent, failed))) => {
                format!("New blog notification sent to {sent} users, {failed} failed")
            }
            Err(e) => format!("Failed to send blog notifications: {e}"),
        }
    }

    async fn try_new_blog_notification(&self, blog_id: PostId) -> Result<Option<(usize, usize)>, NotifyError> {
        let post = self
            .store
            .post(blog_id)
            .await?
            .ok_or_else(|| NotifyError::Missing(format!("blog {blog_id}")))?;
        if !post.is_published() {
            return Ok(None);
        }
        let author = self.store.user(post.author).await?;
        let recipients = self.store.subscribers(post.author).await?;

        let (mut sent, mut failed) = (0, 0);
        for recipient in &recipients {
            let mail = template::new_blog_notification(&self.from, recipient, &post, author.as_ref());
            match self.mailer.send(mail).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(blog_id, recipient = %recipient.email, error = %e, "failed to deliver blog notification");
                }
            }
        }
        Ok(Some((sent, failed)))
    }

    /// Schedule a [`Job::NewBlogNotification`] for every post published
    /// within the window ending at `now`.
    pub async fn check_for_new_blogs(&self, now: DateTime<Utc>) -> String {
        match self.try_check_for_new_blogs(now).await {
            Ok(count) => format!("Scheduled notifications for {count} new blogs"),
            Err(e) => format!("Failed to schedule blog notifications: {e}"),
        }
    }

    async fn try_check_for_new_blogs(&self, now: DateTime<Utc>) -> Result<usize, NotifyError> {
        let posts = self.store.posts(PostFilter::published().since(now - self.window)).await?;
        for post in &posts {
            self.queue.enqueue(Job::NewBlogNotification { blog_id: post.id })?;
        }
        Ok(posts.len())
    }
}
