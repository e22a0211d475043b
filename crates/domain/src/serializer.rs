//! JSON views of the records and validation of client input.
//!
//! A top-level comment serializes with its direct replies nested under
//! `replies`. Replies serialize without that key, so a reply never expands
//! its own children.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, FIELD_BLANK, FIELD_REQUIRED, FieldErrors, Result};
use crate::model::{BlogPost, Comment, CommentId, NewComment, PostId, PostStatus, User, UserId};
use crate::store::Store;

/// Public view of a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorView {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Mail address.
    pub email: String,
}

impl From<&User> for AuthorView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// A comment with its direct replies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    /// Comment id.
    pub id: CommentId,
    /// Text.
    pub comment: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Owning post id.
    pub post: PostId,
    /// Author, `null` when unknown.
    pub user: Option<AuthorView>,
    /// Parent comment id, `null` for top-level comments.
    pub reply: Option<CommentId>,
    /// Direct replies. Always empty for a reply.
    pub replies: Vec<ReplyView>,
}

/// A reply, serialized without nested children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyView {
    /// Comment id.
    pub id: CommentId,
    /// Text.
    pub comment: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Owning post id.
    pub post: PostId,
    /// Author, `null` when unknown.
    pub user: Option<AuthorView>,
    /// Parent comment id.
    pub reply: Option<CommentId>,
}

/// A blog post with its author expanded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPostView {
    /// Post id.
    pub id: PostId,
    /// Headline.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Subtitle, blank when unset.
    pub subtitle: String,
    /// Body.
    pub content: String,
    /// Publication time.
    pub published_date: DateTime<Utc>,
    /// Draft or published.
    pub status: PostStatus,
    /// Author, `null` when the user no longer exists.
    pub author: Option<AuthorView>,
}

async fn author_view(store: &dyn Store, user: Option<UserId>) -> Result<Option<AuthorView>> {
    match user {
        Some(id) => Ok(store.user(id).await?.as_ref().map(AuthorView::from)),
        None => Ok(None),
    }
}

/// Serialize a comment as a reply.
pub async fn serialize_reply(store: &dyn Store, comment: &Comment) -> Result<ReplyView> {
    Ok(ReplyView {
        id: comment.id,
        comment: comment.comment.clone(),
        created_at: comment.created_at,
        post: comment.post,
        user: author_view(store, comment.user).await?,
        reply: comment.reply,
    })
}

/// Serialize a list of replies, keeping their order.
pub async fn serialize_replies(store: &dyn Store, comments: &[Comment]) -> Result<Vec<ReplyView>> {
    let mut views = Vec::with_capacity(comments.len());
    for comment in comments {
        views.push(serialize_reply(store, comment).await?);
    }
    Ok(views)
}

/// Serialize a comment, nesting its direct replies when it is top-level.
pub async fn serialize_comment(store: &dyn Store, comment: &Comment) -> Result<CommentView> {
    let replies = if comment.is_top_level() {
        let children = store.replies(comment.id).await?;
        serialize_replies(store, &children).await?
    } else {
        Vec::new()
    };
    Ok(CommentView {
        id: comment.id,
        comment: comment.comment.clone(),
        created_at: comment.created_at,
        post: comment.post,
        user: author_view(store, comment.user).await?,
        reply: comment.reply,
        replies,
    })
}

/// Serialize a list of comments, keeping their order.
pub async fn serialize_comments(store: &dyn Store, comments: &[Comment]) -> Result<Vec<CommentView>> {
    let mut views = Vec::with_capacity(comments.len());
    for comment in comments {
        views.push(serialize_comment(store, comment).await?);
    }
    Ok(views)
}

/// Serialize a blog post.
pub async fn serialize_post(store: &dyn Store, post: &BlogPost) -> Result<BlogPostView> {
    Ok(BlogPostView {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        subtitle: post.subtitle.clone(),
        content: post.content.clone(),
        published_date: post.published_date,
        status: post.status,
        author: author_view(store, Some(post.author)).await?,
    })
}

/// Serialize a list of blog posts, keeping their order.
pub async fn serialize_posts(store: &dyn Store, posts: &[BlogPost]) -> Result<Vec<BlogPostView>> {
    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        views.push(serialize_post(store, post).await?);
    }
    Ok(views)
}

/// Client-submitted comment.
///
/// Every field is optional on the wire so that missing fields surface as
/// field errors instead of a parse failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInput {
    /// Target post.
    #[serde(default)]
    pub post: Option<PostId>,
    /// Text.
    #[serde(default)]
    pub comment: Option<String>,
    /// Parent comment.
    #[serde(default)]
    pub reply: Option<CommentId>,
    /// Author. Defaults to the requesting principal.
    #[serde(default)]
    pub user: Option<UserId>,
}

impl CommentInput {
    /// A top-level comment on `post`.
    pub fn new(post: PostId, comment: impl Into<String>) -> Self {
        Self {
            post: Some(post),
            comment: Some(comment.into()),
            reply: None,
            user: None,
        }
    }

    /// Sets the parent comment and returns `Self`.
    #[must_use]
    pub fn reply_to(mut self, parent: CommentId) -> Self {
        self.reply = Some(parent);
        self
    }

    /// Check the input against the store and build the record to insert.
    ///
    /// When `user` is absent the `principal` is attached as author.
    pub async fn validate(self, store: &dyn Store, principal: Option<&User>) -> Result<NewComment> {
        let mut errors = FieldErrors::new();

        let comment = match self.comment {
            Some(text) if text.trim().is_empty() => {
                errors.add("comment", FIELD_BLANK);
                None
            }
            Some(text) => Some(text),
            None => {
                errors.add("comment", FIELD_REQUIRED);
                None
            }
        };

        let post = match self.post {
            Some(id) if store.post(id).await?.is_some() => Some(id),
            Some(id) => {
                errors.add("post", format!("Invalid pk \"{id}\" - object does not exist."));
                None
            }
            None => {
                errors.add("post", FIELD_REQUIRED);
                None
            }
        };

        if let Some(parent) = self.reply {
            match store.comment(parent).await? {
                Some(found) if post.is_some_and(|post| post != found.post) => {
                    errors.add("reply", "Reply must belong to the same post.");
                }
                Some(_) => {}
                None => {
                    errors.add("reply", format!("Invalid pk \"{parent}\" - object does not exist."));
                }
            }
        }

        let user = match self.user {
            Some(id) if store.user(id).await?.is_some() => Some(id),
            Some(id) => {
                errors.add("user", format!("Invalid pk \"{id}\" - object does not exist."));
                None
            }
            None => principal.map(|user| user.id),
        };

        match (comment, post) {
            (Some(comment), Some(post)) if errors.is_empty() => Ok(NewComment {
                comment,
                post,
                user,
                reply: self.reply,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }

    /// Validate the input and insert the comment.
    pub async fn create(self, store: &dyn Store, principal: Option<&User>) -> Result<Comment> {
        let new_comment = self.validate(store, principal).await?;
        store.create_comment(new_comment).await
    }
}
