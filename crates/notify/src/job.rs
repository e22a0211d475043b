//! Units of work run by the [`Worker`](crate::Worker).
use std::fmt::{self, Display, Formatter};

use inkpost_domain::{CommentId, PostId};
use serde::{Deserialize, Serialize};

/// A notification job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Job {
    /// Tell a post's author about a new comment.
    CommentNotification {
        /// Comment that was created.
        comment_id: CommentId,
    },
    /// Announce a published post to every subscriber.
    NewBlogNotification {
        /// Post that was published.
        blog_id: PostId,
    },
    /// Schedule announcements for posts published within the sweep window.
    CheckForNewBlogs,
}

impl Job {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CommentNotification { .. } => "comment_notification",
            Self::NewBlogNotification { .. } => "new_blog_notification",
            Self::CheckForNewBlogs => "check_for_new_blogs",
        }
    }
}

impl Display for Job {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommentNotification { comment_id } => write!(f, "{}({comment_id})", self.name()),
            Self::NewBlogNotification { blog_id } => write!(f, "{}({blog_id})", self.name()),
            Self::CheckForNewBlogs => f.write_str(self.name()),
        }
    }
}
