use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::parse_id;
use super::users::AuthorDto;
use crate::domain::comment::{CommentThread, CreateCommentRequest, UpdateCommentRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: Uuid,
    pub(crate) content: String,
    pub(crate) post_id: Uuid,
    pub(crate) author_id: Uuid,
    pub(crate) parent_id: Option<Uuid>,
    pub(crate) author: Option<AuthorDto>,
    #[schema(no_recursion)]
    pub(crate) replies: Vec<CommentDto>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<CommentThread> for CommentDto {
    fn from(thread: CommentThread) -> Self {
        let comment = thread.comment;
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            author: thread.author.map(AuthorDto::from),
            replies: thread.replies.into_iter().map(CommentDto::from).collect(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 1, max = 10000))]
    pub(crate) content: String,
    pub(crate) parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateCommentDto {
    #[validate(length(min = 1, max = 10000))]
    pub(crate) content: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/posts/{post_id}",
    tag = "comments",
    params(
        ("post_id" = Uuid, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Threaded comments", body = [CommentDto]),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Post not found or not published"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<(StatusCode, Json<Vec<CommentDto>>)> {
    let post_id = parse_id(&post_id, "post")?;
    let threads = state.comment_service.list_for_post(post_id).await?;
    Ok((
        StatusCode::OK,
        Json(threads.into_iter().map(CommentDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    params(
        ("id" = Uuid, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment with its replies", body = CommentDto),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let id = parse_id(&id, "comment")?;
    let thread = state.comment_service.get_comment(id).await?;
    Ok((StatusCode::OK, Json(CommentDto::from(thread))))
}

#[utoipa::path(
    post,
    path = "/api/v1/comments/posts/{post_id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = Uuid, Path, description = "Post id")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<String>,
    Json(dto): Json<CreateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let post_id = parse_id(&post_id, "post")?;
    dto.validate()?;
    let req = CreateCommentRequest {
        content: dto.content,
        parent_id: dto.parent_id,
    };

    let thread = state
        .comment_service
        .create_comment(auth.actor(), post_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentDto::from(thread))))
}

#[utoipa::path(
    put,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Comment id")
    ),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    Json(dto): Json<UpdateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let id = parse_id(&id, "comment")?;
    dto.validate()?;
    let req = UpdateCommentRequest {
        content: dto.content,
    };

    let thread = state
        .comment_service
        .update_comment(auth.actor(), id, req)
        .await?;
    Ok((StatusCode::OK, Json(CommentDto::from(thread))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 400, description = "Invalid id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, "comment")?;
    state
        .comment_service
        .delete_comment(auth.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
