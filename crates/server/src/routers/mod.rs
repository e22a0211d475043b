//! Route table of the HTTP API.
//!
//! Static `blogs/...` segments are registered before `blogs/{slug}` so that
//! they are never taken for a slug.
use salvo::logging::Logger;
use salvo::prelude::*;

use crate::auth::auth_hoop;
use crate::state::AppState;

mod blogs;
mod comments;
mod contact;

/// Build the router serving the whole API.
pub fn router(state: AppState, jwt_secret: &str) -> Router {
    Router::new()
        .hoop(Logger::new())
        .hoop(affix_state::inject(state))
        .hoop(auth_hoop(jwt_secret))
        .push(blogs::index_router())
        .push(comments::router())
        .push(blogs::manage_router())
        .push(blogs::detail_router())
        .push(contact::router())
}

/// Build the service serving the whole API.
pub fn service(state: AppState, jwt_secret: &str) -> Service {
    Service::new(router(state, jwt_secret))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use chrono::TimeDelta;
    use inkpost_domain::{BlogPost, MemoryStore, NewPost, NewUser, PostStatus, Store, User};
    use inkpost_notify::{MemoryMailer, MemoryQueue};
    use salvo::Service;

    use crate::auth::encode_token;
    use crate::state::AppState;

    pub(crate) const BASE: &str = "http://127.0.0.1:8698";
    const SECRET: &str = "test-secret";

    /// A service over in-memory collaborators with two users and one
    /// published post by the first.
    pub(crate) struct Harness {
        pub(crate) store: Arc<MemoryStore>,
        pub(crate) queue: Arc<MemoryQueue>,
        pub(crate) mailer: Arc<MemoryMailer>,
        pub(crate) service: Service,
        pub(crate) user: User,
        pub(crate) other: User,
        pub(crate) post: BlogPost,
    }

    impl Harness {
        pub(crate) async fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let queue = Arc::new(MemoryQueue::new());
            let mailer = Arc::new(MemoryMailer::new());
            let user = store
                .create_user(NewUser::new("testuser", "testuser@example.com").verified(true))
                .await
                .unwrap();
            let other = store
                .create_user(NewUser::new("testuser2", "testuser2@example.com").verified(true))
                .await
                .unwrap();
            let post = store
                .create_post(
                    NewPost::new("Test Blog", "This is test content for the blog post.", user.id)
                        .status(PostStatus::Published),
                )
                .await
                .unwrap();
            let state = AppState::new(store.clone(), queue.clone(), mailer.clone(), "contact@example.com");
            Self {
                store,
                queue,
                mailer,
                service: super::service(state, SECRET),
                user,
                other,
                post,
            }
        }

        pub(crate) fn token(&self, user: &User) -> String {
            encode_token(SECRET, user, TimeDelta::hours(1)).unwrap()
        }

        /// Comments on `post` at any depth.
        pub(crate) async fn comment_count(&self, post: u64) -> usize {
            let mut pending = self.store.top_level_comments(post).await.unwrap();
            let mut count = 0;
            while let Some(comment) = pending.pop() {
                count += 1;
                pending.extend(self.store.replies(comment.id).await.unwrap());
            }
            count
        }
    }
}
