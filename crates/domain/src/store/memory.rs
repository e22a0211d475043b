use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::Store;
use crate::error::{Error, FIELD_BLANK, Result};
use crate::model::{
    BlogPost, Comment, CommentId, NewComment, NewPost, NewUser, PostChanges, PostFilter, PostId,
    User, UserId,
};
use crate::slug::slugify;

/// A store keeping every record in memory.
///
/// Comments live in one flat table keyed by id. Parent to child links are
/// kept in a secondary index so replies are looked up without scanning.
#[derive(Default, Debug)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default, Debug)]
struct Tables {
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<PostId, BlogPost>,
    comments: BTreeMap<CommentId, Comment>,
    replies: HashMap<CommentId, Vec<CommentId>>,
    last_user_id: UserId,
    last_post_id: PostId,
    last_comment_id: CommentId,
}

impl Tables {
    /// Slug for `title`, unless it is blank or held by a post other than `except`.
    fn claim_slug(&self, title: &str, except: Option<PostId>) -> Result<String> {
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(Error::invalid("slug", FIELD_BLANK));
        }
        if self
            .posts
            .values()
            .any(|post| post.slug == slug && Some(post.id) != except)
        {
            return Err(Error::invalid("slug", "blog post with this slug already exists."));
        }
        Ok(slug)
    }

    fn remove_comment_tree(&mut self, id: CommentId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(children) = self.replies.remove(&id) {
                pending.extend(children);
            }
            if let Some(Comment {
                reply: Some(parent),
                ..
            }) = self.comments.remove(&id)
                && let Some(siblings) = self.replies.get_mut(&parent)
            {
                siblings.retain(|sibling| *sibling != id);
            }
        }
    }
}

impl MemoryStore {
    /// Create an empty `MemoryStore`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.inner.write().await;
        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn subscribers(&self, exclude: UserId) -> Result<Vec<User>> {
        let tables = self.inner.read().await;
        Ok(tables
            .users
            .values()
            .filter(|user| user.is_active && user.is_email_verified && user.id != exclude)
            .cloned()
            .collect())
    }

    async fn create_post(&self, post: NewPost) -> Result<BlogPost> {
        let mut tables = self.inner.write().await;
        if !tables.users.contains_key(&post.author) {
            return Err(Error::invalid(
                "author",
                format!("Invalid pk \"{}\" - object does not exist.", post.author),
            ));
        }
        let slug = tables.claim_slug(&post.title, None)?;
        tables.last_post_id += 1;
        let post = BlogPost {
            id: tables.last_post_id,
            title: post.title,
            slug,
            subtitle: post.subtitle,
            content: post.content,
            published_date: post.published_date.unwrap_or_else(Utc::now),
            status: post.status,
            author: post.author,
        };
        tables.posts.insert(post.id, post.clone());
        tracing::debug!(post_id = post.id, slug = %post.slug, "post inserted");
        Ok(post)
    }

    async fn post(&self, id: PostId) -> Result<Option<BlogPost>> {
        Ok(self.inner.read().await.posts.get(&id).cloned())
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        let tables = self.inner.read().await;
        Ok(tables.posts.values().find(|post| post.slug == slug).cloned())
    }

    async fn posts(&self, filter: PostFilter) -> Result<Vec<BlogPost>> {
        let tables = self.inner.read().await;
        let mut posts: Vec<BlogPost> = tables
            .posts
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        posts.sort_by_key(|post| Reverse((post.published_date, post.id)));
        Ok(posts)
    }

    async fn update_post(&self, id: PostId, changes: PostChanges) -> Result<BlogPost> {
        let mut tables = self.inner.write().await;
        let slug = tables.claim_slug(&changes.title, Some(id))?;
        let post = tables
            .posts
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Blog does not exist"))?;
        post.title = changes.title;
        post.slug = slug;
        if let Some(subtitle) = changes.subtitle {
            post.subtitle = subtitle;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(status) = changes.status {
            post.status = status;
        }
        if let Some(published_date) = changes.published_date {
            post.published_date = published_date;
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: PostId) -> Result<()> {
        let mut tables = self.inner.write().await;
        if tables.posts.remove(&id).is_none() {
            return Err(Error::not_found("Blog does not exist"));
        }
        let roots: Vec<CommentId> = tables
            .comments
            .values()
            .filter(|comment| comment.post == id && comment.is_top_level())
            .map(|comment| comment.id)
            .collect();
        for root in roots {
            tables.remove_comment_tree(root);
        }
        Ok(())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut tables = self.inner.write().await;
        if !tables.posts.contains_key(&comment.post) {
            return Err(Error::invalid(
                "post",
                format!("Invalid pk \"{}\" - object does not exist.", comment.post),
            ));
        }
        if let Some(user) = comment.user
            && !tables.users.contains_key(&user)
        {
            return Err(Error::invalid(
                "user",
                format!("Invalid pk \"{user}\" - object does not exist."),
            ));
        }
        if let Some(parent) = comment.reply {
            match tables.comments.get(&parent) {
                Some(parent) if parent.post == comment.post => {}
                Some(_) => return Err(Error::invalid("reply", "Reply must belong to the same post.")),
                None => {
                    return Err(Error::invalid(
                        "reply",
                        format!("Invalid pk \"{parent}\" - object does not exist."),
                    ));
                }
            }
        }

        tables.last_comment_id += 1;
        let comment = Comment {
            id: tables.last_comment_id,
            comment: comment.comment,
            created_at: Utc::now(),
            post: comment.post,
            user: comment.user,
            reply: comment.reply,
        };
        if let Some(parent) = comment.reply {
            tables.replies.entry(parent).or_default().push(comment.id);
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn comment(&self, id: CommentId) -> Result<Option<Comment>> {
        Ok(self.inner.read().await.comments.get(&id).cloned())
    }

    async fn top_level_comments(&self, post: PostId) -> Result<Vec<Comment>> {
        let tables = self.inner.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|comment| comment.post == post && comment.is_top_level())
            .cloned()
            .collect();
        comments.sort_by_key(|comment| Reverse((comment.created_at, comment.id)));
        Ok(comments)
    }

    async fn replies(&self, parent: CommentId) -> Result<Vec<Comment>> {
        let tables = self.inner.read().await;
        Ok(tables
            .replies
            .get(&parent)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|id| tables.comments.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
