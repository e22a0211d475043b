use inkpost_domain::Error as DomainError;
use inkpost_domain::serializer::{self, CommentInput};
use inkpost_notify::Job;
use salvo::prelude::*;
use serde_json::json;

use crate::auth::require_user;
use crate::error::ApiError;
use crate::state::AppState;

pub(super) fn router() -> Router {
    Router::new()
        .push(
            Router::with_path("blogs/comment/{blog_id}")
                .get(list_comments)
                .post(create_comment),
        )
        .push(
            Router::with_path("blogs/reply/{comment_id}")
                .get(list_replies)
                .post(create_reply),
        )
}

/// The comment body of `req`. An empty body reads as an input with no fields.
async fn comment_input(req: &mut Request) -> Result<CommentInput, ApiError> {
    if req.payload().await?.iter().all(u8::is_ascii_whitespace) {
        return Ok(CommentInput::default());
    }
    Ok(req.parse_json().await?)
}

/// Top-level comments of a post, newest first, each with its replies.
#[handler]
async fn list_comments(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let store = state.store.as_ref();
    let post = match req.param::<u64>("blog_id") {
        Some(id) => store.post(id).await?,
        None => None,
    }
    .ok_or_else(|| DomainError::not_found("Blog does not exist"))?;

    let comments = store.top_level_comments(post.id).await?;
    res.render(Json(serializer::serialize_comments(store, &comments).await?));
    Ok(())
}

/// Comment on a post. `post` and `reply` in the body are ignored.
#[handler]
async fn create_comment(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let store = state.store.as_ref();
    let user = require_user(depot, store).await?;
    let post = match req.param::<u64>("blog_id") {
        Some(id) => store.post(id).await?,
        None => None,
    }
    .ok_or_else(|| DomainError::not_found("Blog does not exist"))?;

    let mut input = comment_input(req).await?;
    input.post = Some(post.id);
    input.reply = None;
    input.user = None;
    let comment = input.create(store, Some(&user)).await?;
    tracing::info!(comment_id = comment.id, post_id = post.id, user_id = user.id, "comment created");
    state.notify(Job::CommentNotification { comment_id: comment.id });

    let view = serializer::serialize_comment(store, &comment).await?;
    res.status_code(StatusCode::CREATED);
    res.render(Json(json!({
        "message": "Comment created successfully",
        "comment": view,
    })));
    Ok(())
}

/// Direct replies to a comment, in insertion order.
#[handler]
async fn list_replies(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let store = state.store.as_ref();
    let replies = match req.param::<u64>("comment_id") {
        Some(id) => store.replies(id).await?,
        None => Vec::new(),
    };
    res.render(Json(serializer::serialize_replies(store, &replies).await?));
    Ok(())
}

/// Reply to a comment. `post` and `reply` are taken from the parent.
#[handler]
async fn create_reply(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), ApiError> {
    let state = AppState::obtain(depot)?;
    let store = state.store.as_ref();
    let user = require_user(depot, store).await?;
    let parent = match req.param::<u64>("comment_id") {
        Some(id) => store.comment(id).await?,
        None => None,
    }
    .ok_or_else(|| DomainError::not_found("Comment does not exist"))?;

    let mut input = comment_input(req).await?;
    input.post = Some(parent.post);
    input.reply = Some(parent.id);
    input.user = None;
    let reply = input.create(store, Some(&user)).await?;
    tracing::info!(comment_id = reply.id, parent_id = parent.id, user_id = user.id, "reply created");
    state.notify(Job::CommentNotification { comment_id: reply.id });

    let view = serializer::serialize_reply(store, &reply).await?;
    res.status_code(StatusCode::CREATED);
    res.render(Json(json!({
        "message": "Reply created successfully",
        "reply": view,
    })));
    Ok(())
}
