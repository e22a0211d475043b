//! Persistence contract for users, posts and comments.
//!
//! The HTTP layer and the notification jobs only ever talk to a
//! `dyn Store`. [`MemoryStore`] is the bundled implementation.
use async_trait::async_trait;

use crate::Result;
use crate::model::{
    BlogPost, Comment, CommentId, NewComment, NewPost, NewUser, PostChanges, PostFilter, PostId,
    User, UserId,
};

mod memory;
pub use memory::MemoryStore;

/// Storage backend for inkpost records.
///
/// Every method is atomic on its own; callers never get a transaction that
/// spans several calls.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Insert a user.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Look up a user by id.
    async fn user(&self, id: UserId) -> Result<Option<User>>;

    /// Active, email-verified users other than `exclude`, ordered by id.
    async fn subscribers(&self, exclude: UserId) -> Result<Vec<User>>;

    /// Insert a post, deriving its slug from the title.
    ///
    /// Fails with a validation error on `slug` when the slug is blank or taken.
    async fn create_post(&self, post: NewPost) -> Result<BlogPost>;

    /// Look up a post by id.
    async fn post(&self, id: PostId) -> Result<Option<BlogPost>>;

    /// Look up a post by slug.
    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;

    /// Posts matching `filter`, most recently published first.
    async fn posts(&self, filter: PostFilter) -> Result<Vec<BlogPost>>;

    /// Apply `changes` to a post and recompute its slug.
    async fn update_post(&self, id: PostId, changes: PostChanges) -> Result<BlogPost>;

    /// Delete a post together with all of its comments.
    async fn delete_post(&self, id: PostId) -> Result<()>;

    /// Insert a comment, stamping `created_at`.
    ///
    /// The post, the user and the parent comment must exist, and the parent
    /// must belong to the same post.
    async fn create_comment(&self, comment: NewComment) -> Result<Comment>;

    /// Look up a comment by id.
    async fn comment(&self, id: CommentId) -> Result<Option<Comment>>;

    /// Top-level comments of a post, newest first.
    async fn top_level_comments(&self, post: PostId) -> Result<Vec<Comment>>;

    /// Direct replies to a comment, in insertion order.
    async fn replies(&self, parent: CommentId) -> Result<Vec<Comment>>;
}
