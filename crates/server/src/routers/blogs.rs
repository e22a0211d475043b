use chrono::{DateTime, Utc};
use inkpost_domain::error::FIELD_REQUIRED;
use inkpost_domain::serializer::{serialize_post, serialize_posts};
use inkpost_domain::{BlogPost, Error as DomainError, NewPost, PostChanges, PostFilter, PostId, PostStatus, User};
use inkpost_notify::Job;
use salvo::prelude::*;
use serde::Deserialize;

use crate::auth::require_user;
use crate::error::ApiError;
use crate::state::AppState;

pub(super) fn index_router() -> Router {
    Router::with_path("blogs").get(list_blogs)
}

pub(super) fn manage_router() -> Router {
    Router::with_path("blogs")
        .push(Router::with_path("user").get(user_blogs))
        .push(Router::with_path("create").post(create_blog))
        .push(Router::with_path("update").post(update_blog))
        .push(Router::with_path("delete").post(delete_blog))
}

pub(super) fn detail_router() -> Router {
    Router::with_path("blogs/{slug}").get(get_blog)
}

/// Body of the create, update and delete endpoints.
#[derive(Debug, Default, Deserialize)]
struct PostInput {
    id: Option<PostId>,
    title: Option<String>,
    subtitle: Option<String>,
    content: Option<String>,
    status: Option<PostStatus>,
    published_date: Option<DateTime<Utc>>,
}

impl PostInput {
    fn title(&mut self) -> Result<String, ApiError> {
        match self.title.take() {
            Some(title) if !title.trim().is_empty() => Ok(title),
            _ => Err(ApiError::bad_request("Title is required.")),
        }
    }
}

async fn owned_post(state: &AppState, user: &User, id: Option<PostId>) -> Result<BlogPost, ApiError> {
    let post = match id {
        Some(id) => state.store.post(id).await?,
        None => None,
    }
    .ok_or_else(|| DomainError::not_found("Blog does not exist"))?;
    if post.author != user.id {
        return Err(DomainError::Forbidden.into());
    }
    Ok(post)
}

/// Published posts, newest first.
#[handler]
async fn list_blogs(depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let posts = state.store.posts(PostFilter::published()).await?;
    res.render(Json(serialize_posts(state.store.as_ref(), &posts).await?));
    Ok(())
}

/// Every post of the caller, drafts included.
#[handler]
async fn user_blogs(depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let user = require_user(depot, state.store.as_ref()).await?;
    let posts = state.store.posts(PostFilter::all().by_author(user.id)).await?;
    res.render(Json(serialize_posts(state.store.as_ref(), &posts).await?));
    Ok(())
}

#[handler]
async fn get_blog(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let slug = req.param::<String>("slug").unwrap_or_default();
    let post = state
        .store
        .post_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Blog does not exist"))?;
    res.render(Json(serialize_post(state.store.as_ref(), &post).await?));
    Ok(())
}

#[handler]
async fn create_blog(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let user = require_user(depot, state.store.as_ref()).await?;
    let mut input = req.parse_json::<PostInput>().await?;
    let title = input.title()?;
    let Some(content) = input.content.take() else {
        return Err(DomainError::invalid("content", FIELD_REQUIRED).into());
    };

    let mut new_post = NewPost::new(title, content, user.id)
        .subtitle(input.subtitle.unwrap_or_default())
        .status(input.status.unwrap_or_default());
    if let Some(date) = input.published_date {
        new_post = new_post.published_date(date);
    }
    let post = state.store.create_post(new_post).await?;
    tracing::info!(post_id = post.id, slug = %post.slug, status = %post.status, "post created");
    if post.is_published() {
        state.notify(Job::NewBlogNotification { blog_id: post.id });
    }

    res.status_code(StatusCode::CREATED);
    res.render(Json(serialize_post(state.store.as_ref(), &post).await?));
    Ok(())
}

#[handler]
async fn update_blog(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let user = require_user(depot, state.store.as_ref()).await?;
    let mut input = req.parse_json::<PostInput>().await?;
    let post = owned_post(&state, &user, input.id).await?;
    let title = input.title()?;

    let changes = PostChanges {
        title,
        subtitle: input.subtitle,
        content: input.content,
        status: input.status,
        published_date: input.published_date,
    };
    let updated = state.store.update_post(post.id, changes).await?;
    tracing::info!(post_id = updated.id, slug = %updated.slug, status = %updated.status, "post updated");
    if !post.is_published() && updated.is_published() {
        state.notify(Job::NewBlogNotification { blog_id: updated.id });
    }

    res.render(Json(serialize_post(state.store.as_ref(), &updated).await?));
    Ok(())
}

#[handler]
async fn delete_blog(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let user = require_user(depot, state.store.as_ref()).await?;
    let input = req.parse_json::<PostInput>().await?;
    let post = owned_post(&state, &user, input.id).await?;
    state.store.delete_post(post.id).await?;
    tracing::info!(post_id = post.id, "post deleted");
    res.status_code(StatusCode::NO_CONTENT);
    Ok(())
}

#[cfg(test)]
mod tests {
    use inkpost_domain::{NewUser, Store};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};

    use crate::routers::tests::{BASE, Harness};

    use super::*;

    #[tokio::test]
    async fn test_list_and_get() {
        let h = Harness::new().await;
        h.store
            .create_post(NewPost::new("Secret Draft", "Not yet", h.user.id))
            .await
            .unwrap();

        let mut res = TestClient::get(format!("{BASE}/blogs/")).send(&h.service).await;
        assert_eq!(res.status_code, Some(StatusCode::OK));
        let body: Value = res.take_json().await.unwrap();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["slug"], "test-blog");
        assert_eq!(body[0]["author"]["username"], "testuser");

        let mut res = TestClient::get(format!("{BASE}/blogs/test-blog/")).send(&h.service).await;
        assert_eq!(res.status_code, Some(StatusCode::OK));
        let body: Value = res.take_json().await.unwrap();
        assert_eq!(body["title"], "Test Blog");

        let mut res = TestClient::get(format!("{BASE}/blogs/missing")).send(&h.service).await;
        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
        let body: Value = res.take_json().await.unwrap();
        assert_eq!(body, json!({"message": "Blog does not exist"}));
    }

    #[tokio::test]
    async fn test_user_blogs() {
        let h = Harness::new().await;
        h.store
            .create_post(NewPost::new("Secret Draft", "Not yet", h.user.id))
            .await
            .unwrap();

        let mut res = TestClient::get(format!("{BASE}/blogs/user/"))
            .bearer_auth(h.token(&h.user))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));
        let body: Value = res.take_json().await.unwrap();
        assert_eq!(body.as_array().unwrap().len(), 2);

        let mut res = TestClient::get(format!("{BASE}/blogs/user/"))
            .bearer_auth(h.token(&h.other))
            .send(&h.service)
            .await;
        assert_eq!(res.take_json::<Value>().await.unwrap(), json!([]));

        let res = TestClient::get(format!("{BASE}/blogs/user/")).send(&h.service).await;
        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_create_blog() {
        let h = Harness::new().await;
        let mut res = TestClient::post(format!("{BASE}/blogs/create/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"title": "New Test Blog", "content": "New content", "status": "published"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        let body: Value = res.take_json().await.unwrap();
        assert_eq!(body["slug"], "new-test-blog");
        assert_eq!(body["author"]["id"], h.user.id);
        let blog_id = body["id"].as_u64().unwrap();
        assert_eq!(h.queue.take(), [Job::NewBlogNotification { blog_id }]);

        let res = TestClient::post(format!("{BASE}/blogs/create/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"title": "Quiet Draft", "content": "Later"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert!(h.queue.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_create_blog_errors() {
        let h = Harness::new().await;
        let mut res = TestClient::post(format!("{BASE}/blogs/create/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"content": "No title"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(res.take_json::<Value>().await.unwrap(), json!({"error": "Title is required."}));

        let mut res = TestClient::post(format!("{BASE}/blogs/create/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"title": "Test Blog", "content": "Duplicate"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        let body: Value = res.take_json().await.unwrap();
        assert!(body.get("slug").is_some());

        let mut res = TestClient::post(format!("{BASE}/blogs/create/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"title": "!!!", "content": "x", "status": "published"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            res.take_json::<Value>().await.unwrap(),
            json!({"slug": ["This field may not be blank."]})
        );
        assert!(h.queue.jobs().is_empty());

        let mut res = TestClient::post(format!("{BASE}/blogs/create/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"title": "No content"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            res.take_json::<Value>().await.unwrap(),
            json!({"content": ["This field is required."]})
        );

        let res = TestClient::post(format!("{BASE}/blogs/create/"))
            .json(&json!({"title": "Anonymous", "content": "Nope"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_update_blog() {
        let h = Harness::new().await;
        let draft = h
            .store
            .create_post(NewPost::new("Draft Blog", "Draft content", h.user.id))
            .await
            .unwrap();

        let mut res = TestClient::post(format!("{BASE}/blogs/update/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"id": draft.id, "title": "Updated Title", "status": "published"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));
        let body: Value = res.take_json().await.unwrap();
        assert_eq!(body["slug"], "updated-title");
        assert_eq!(body["content"], "Draft content");
        assert_eq!(body["status"], "published");
        assert_eq!(h.queue.take(), [Job::NewBlogNotification { blog_id: draft.id }]);

        let res = TestClient::post(format!("{BASE}/blogs/update/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"id": draft.id, "title": "Updated Again"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(h.queue.jobs().is_empty());

        let mut res = TestClient::post(format!("{BASE}/blogs/update/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"id": draft.id, "title": ""}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(res.take_json::<Value>().await.unwrap(), json!({"error": "Title is required."}));
    }

    #[tokio::test]
    async fn test_update_and_delete_require_ownership() {
        let h = Harness::new().await;
        let mut res = TestClient::post(format!("{BASE}/blogs/update/"))
            .bearer_auth(h.token(&h.other))
            .json(&json!({"id": h.post.id, "title": "Hijacked"}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
        let body: Value = res.take_json().await.unwrap();
        assert_eq!(body["detail"], "You do not have permission to perform this action.");

        let res = TestClient::post(format!("{BASE}/blogs/delete/"))
            .bearer_auth(h.token(&h.other))
            .json(&json!({"id": h.post.id}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
        assert_eq!(h.store.post(h.post.id).await.unwrap(), Some(h.post.clone()));

        let res = TestClient::post(format!("{BASE}/blogs/delete/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"id": 999}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_delete_blog() {
        let h = Harness::new().await;
        let reader = h
            .store
            .create_user(NewUser::new("reader", "reader@example.com"))
            .await
            .unwrap();
        inkpost_domain::serializer::CommentInput::new(h.post.id, "Bye")
            .create(h.store.as_ref(), Some(&reader))
            .await
            .unwrap();

        let mut res = TestClient::post(format!("{BASE}/blogs/delete/"))
            .bearer_auth(h.token(&h.user))
            .json(&json!({"id": h.post.id}))
            .send(&h.service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));
        assert!(res.take_string().await.unwrap().is_empty());
        assert!(h.store.post(h.post.id).await.unwrap().is_none());
        assert_eq!(h.comment_count(h.post.id).await, 0);
    }
}
