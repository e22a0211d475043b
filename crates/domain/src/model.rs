//! Records persisted by a [`Store`](crate::Store).
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a [`User`].
pub type UserId = u64;
/// Identifier of a [`BlogPost`].
pub type PostId = u64;
/// Identifier of a [`Comment`].
pub type CommentId = u64;

/// An entry of the user directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Address notifications are delivered to.
    pub email: String,
    /// Inactive users cannot act and receive no broadcast mail.
    pub is_active: bool,
    /// Set once the user confirmed their address.
    pub is_email_verified: bool,
}

/// Data needed to insert a [`User`].
#[derive(Clone, Debug)]
pub struct NewUser {
    /// Display name.
    pub username: String,
    /// Mail address.
    pub email: String,
    /// Defaults to `true`.
    pub is_active: bool,
    /// Defaults to `false`.
    pub is_email_verified: bool,
}

impl NewUser {
    /// An active, unverified user.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            is_active: true,
            is_email_verified: false,
        }
    }

    /// Sets `is_active` and returns `Self`.
    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Sets `is_email_verified` and returns `Self`.
    #[must_use]
    pub fn verified(mut self, is_email_verified: bool) -> Self {
        self.is_email_verified = is_email_verified;
        self
    }
}

/// Publication state of a [`BlogPost`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Visible to the author only.
    #[default]
    Draft,
    /// Listed publicly and announced to subscribers.
    Published,
}

impl PostStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl Display for PostStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            other => Err(format!("\"{other}\" is not a valid choice.")),
        }
    }
}

/// A blog post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Primary key.
    pub id: PostId,
    /// Headline.
    pub title: String,
    /// Unique, derived from `title`.
    pub slug: String,
    /// Optional, blank when unset.
    pub subtitle: String,
    /// Body text.
    pub content: String,
    /// When the post went (or will go) public.
    pub published_date: DateTime<Utc>,
    /// Draft or published.
    pub status: PostStatus,
    /// Owning user.
    pub author: UserId,
}

impl BlogPost {
    /// Returns `true` if the post is published.
    #[inline]
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

/// Data needed to insert a [`BlogPost`]. The slug is derived by the store.
#[derive(Clone, Debug)]
pub struct NewPost {
    /// Headline.
    pub title: String,
    /// Optional subtitle, blank when unset.
    pub subtitle: String,
    /// Body text.
    pub content: String,
    /// Defaults to [`PostStatus::Draft`].
    pub status: PostStatus,
    /// Owning user.
    pub author: UserId,
    /// Defaults to the insertion time.
    pub published_date: Option<DateTime<Utc>>,
}

impl NewPost {
    /// A draft post without subtitle.
    pub fn new(title: impl Into<String>, content: impl Into<String>, author: UserId) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            content: content.into(),
            status: PostStatus::Draft,
            author,
            published_date: None,
        }
    }

    /// Sets the subtitle and returns `Self`.
    #[must_use]
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    /// Sets the status and returns `Self`.
    #[must_use]
    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the publication date and returns `Self`.
    #[must_use]
    pub fn published_date(mut self, date: DateTime<Utc>) -> Self {
        self.published_date = Some(date);
        self
    }
}

/// Fields replaced by [`Store::update_post`](crate::Store::update_post).
///
/// The title is always present since every update recomputes the slug.
#[derive(Clone, Debug)]
pub struct PostChanges {
    /// New headline.
    pub title: String,
    /// New subtitle, if changed.
    pub subtitle: Option<String>,
    /// New content, if changed.
    pub content: Option<String>,
    /// New status, if changed.
    pub status: Option<PostStatus>,
    /// New publication date, if changed.
    pub published_date: Option<DateTime<Utc>>,
}

impl PostChanges {
    /// Changes only the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            content: None,
            status: None,
            published_date: None,
        }
    }
}

/// Selects posts for [`Store::posts`](crate::Store::posts).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Only posts with this status.
    pub status: Option<PostStatus>,
    /// Only posts owned by this user.
    pub author: Option<UserId>,
    /// Only posts published at or after this instant.
    pub published_since: Option<DateTime<Utc>>,
}

impl PostFilter {
    /// Matches every post.
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to published posts.
    #[must_use]
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            ..Self::default()
        }
    }

    /// Restrict to posts owned by `author`.
    #[must_use]
    pub fn by_author(mut self, author: UserId) -> Self {
        self.author = Some(author);
        self
    }

    /// Restrict to posts published at or after `since`.
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.published_since = Some(since);
        self
    }

    /// Returns `true` if `post` passes the filter.
    pub fn matches(&self, post: &BlogPost) -> bool {
        self.status.is_none_or(|status| post.status == status)
            && self.author.is_none_or(|author| post.author == author)
            && self.published_since.is_none_or(|since| post.published_date >= since)
    }
}

/// A comment on a blog post, or a reply to another comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Primary key.
    pub id: CommentId,
    /// Text of the comment.
    pub comment: String,
    /// Set once at insertion.
    pub created_at: DateTime<Utc>,
    /// Post the comment belongs to.
    pub post: PostId,
    /// Author, if known.
    pub user: Option<UserId>,
    /// Parent comment. `None` for a top-level comment.
    pub reply: Option<CommentId>,
}

impl Comment {
    /// Returns `true` if the comment has no parent.
    #[inline]
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.reply.is_none()
    }
}

/// Data needed to insert a [`Comment`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewComment {
    /// Text of the comment.
    pub comment: String,
    /// Post the comment belongs to.
    pub post: PostId,
    /// Author, if known.
    pub user: Option<UserId>,
    /// Parent comment.
    pub reply: Option<CommentId>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn post(status: PostStatus, author: UserId, published_date: DateTime<Utc>) -> BlogPost {
        BlogPost {
            id: 1,
            title: "Title".into(),
            slug: "title".into(),
            subtitle: String::new(),
            content: "Content".into(),
            published_date,
            status,
            author,
        }
    }

    #[test]
    fn test_post_status_wire_names() {
        assert_eq!(serde_json::to_string(&PostStatus::Published).unwrap(), "\"published\"");
        assert_eq!("draft".parse::<PostStatus>().unwrap(), PostStatus::Draft);
        assert!("archived".parse::<PostStatus>().is_err());
        assert_eq!(PostStatus::default(), PostStatus::Draft);
    }

    #[test]
    fn test_post_filter_matches() {
        let now = Utc::now();
        let recent = post(PostStatus::Published, 7, now);
        let old = post(PostStatus::Published, 7, now - TimeDelta::hours(2));
        let draft = post(PostStatus::Draft, 8, now);

        let filter = PostFilter::published().since(now - TimeDelta::hours(1));
        assert!(filter.matches(&recent));
        assert!(!filter.matches(&old));
        assert!(!filter.matches(&draft));

        let mine = PostFilter::all().by_author(8);
        assert!(mine.matches(&draft));
        assert!(!mine.matches(&recent));
    }
}
