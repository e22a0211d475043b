//! Domain layer of inkpost.
//!
//! This crate owns the records a blog is made of (users, posts and threaded
//! comments), the [`Store`] contract they are persisted through, and the
//! serializers that turn records into the JSON views the HTTP layer returns.
//!
//! Comments form a self-referential chain: a comment whose `reply` is `None`
//! is a top-level comment, anything else is a reply to the comment it names.
//! Stores keep comments in a flat table keyed by id and answer "children of
//! X" through a secondary index, so the chain never becomes an in-memory
//! pointer graph.
//!
//! # Example
//!
//! ```
//! use inkpost_domain::serializer::{CommentInput, serialize_comment};
//! use inkpost_domain::store::{MemoryStore, Store};
//! use inkpost_domain::{NewPost, NewUser, PostStatus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> inkpost_domain::Result<()> {
//! let store = MemoryStore::new();
//! let author = store.create_user(NewUser::new("ada", "ada@example.com")).await?;
//! let post = store
//!     .create_post(NewPost::new("Hello world", "First!", author.id).status(PostStatus::Published))
//!     .await?;
//!
//! let comment = CommentInput::new(post.id, "Nice post")
//!     .create(&store, Some(&author))
//!     .await?;
//! let view = serialize_comment(&store, &comment).await?;
//! assert_eq!(view.user.map(|u| u.username).as_deref(), Some("ada"));
//! assert!(view.replies.is_empty());
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod model;
pub mod serializer;
pub mod slug;
pub mod store;

pub use error::{Error, FieldErrors, Result};
pub use model::{
    BlogPost, Comment, CommentId, NewComment, NewPost, NewUser, PostChanges, PostFilter, PostId,
    PostStatus, User, UserId,
};
pub use store::{MemoryStore, Store};
