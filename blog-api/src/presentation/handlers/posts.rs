use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::categories::CategoryDto;
use super::comments::CommentDto;
use super::users::AuthorDto;
use super::{PaginationQuery, parse_id};
use crate::application::blog_service::{ListPostsResult, PostDetails, PostSummary};
use crate::data::Pagination;
use crate::domain::post::{CreatePostRequest, PostStatus, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    #[validate(length(max = 255))]
    pub(crate) slug: Option<String>,
    /// `draft` (default) or `published`
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) category_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(max = 255))]
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    #[validate(length(max = 255))]
    pub(crate) slug: Option<String>,
    pub(crate) status: Option<String>,
    /// Replaces the post's categories when present
    pub(crate) category_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct OwnPostsQuery {
    /// Items per page (1..=100, default 10)
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    /// Offset from the beginning
    pub(crate) offset: Option<u32>,
    /// Only posts with this status
    pub(crate) status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: String,
    pub(crate) status: String,
    pub(crate) author_id: Uuid,
    pub(crate) author: Option<AuthorDto>,
    pub(crate) categories: Vec<CategoryDto>,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailsDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) comments: Vec<CommentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) total: i64,
}

impl From<PostSummary> for PostDto {
    fn from(summary: PostSummary) -> Self {
        let post = summary.post;
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            slug: post.slug,
            status: post.status.to_string(),
            author_id: post.author_id,
            author: summary.author.map(AuthorDto::from),
            categories: summary
                .categories
                .into_iter()
                .map(CategoryDto::from)
                .collect(),
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<PostDetails> for PostDetailsDto {
    fn from(details: PostDetails) -> Self {
        let summary = PostSummary {
            post: details.post,
            author: details.author,
            categories: details.categories,
        };
        Self {
            post: summary.into(),
            comments: details.comments.into_iter().map(CommentDto::from).collect(),
        }
    }
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        Self {
            posts: result.posts.into_iter().map(PostDto::from).collect(),
            limit: result.limit,
            offset: result.offset,
            total: result.total,
        }
    }
}

fn parse_status(raw: Option<&str>) -> AppResult<Option<PostStatus>> {
    Ok(raw.map(str::parse::<PostStatus>).transpose()?)
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Published posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    let pagination = query.pagination()?;
    let result = state.blog_service.list_posts(pagination).await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDetailsDto),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Post not found or not published"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<PostDetailsDto>)> {
    let id = parse_id(&id, "post")?;
    let result = state.blog_service.get_post(id).await?;

    Ok((StatusCode::OK, Json(PostDetailsDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/slug/{slug}",
    tag = "posts",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDetailsDto),
        (status = 404, description = "Post not found or not published"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<PostDetailsDto>)> {
    let result = state.blog_service.get_post_by_slug(&slug).await?;

    Ok((StatusCode::OK, Json(PostDetailsDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/user/{user_id}",
    tag = "posts",
    params(
        ("user_id" = Uuid, Path, description = "Author id"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Published posts of the author", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    let user_id = parse_id(&user_id, "user")?;
    let pagination = query.pagination()?;
    let result = state
        .blog_service
        .list_by_author(user_id, pagination)
        .await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/own",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(OwnPostsQuery),
    responses(
        (status = 200, description = "Caller's posts", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_own_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<OwnPostsQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let status = parse_status(query.status.as_deref())?;
    let pagination = Pagination::new(query.limit, query.offset);

    let result = state
        .blog_service
        .list_own(auth.actor(), status, pagination)
        .await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDetailsDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDetailsDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        slug: dto.slug,
        status: parse_status(dto.status.as_deref())?,
        category_ids: dto.category_ids,
    };

    let result = state.blog_service.create_post(auth.actor(), req).await?;
    info!(post_id = %result.post.id, slug = %result.post.slug, by = %auth.username, "post created");
    Ok((StatusCode::CREATED, Json(PostDetailsDto::from(result))))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDetailsDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDetailsDto>)> {
    let id = parse_id(&id, "post")?;
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
        slug: dto.slug,
        status: parse_status(dto.status.as_deref())?,
        category_ids: dto.category_ids,
    };

    let result = state
        .blog_service
        .update_post(auth.actor(), id, req)
        .await?;
    Ok((StatusCode::OK, Json(PostDetailsDto::from(result))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 400, description = "Invalid id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, "post")?;
    state.blog_service.delete_post(auth.actor(), id).await?;
    info!(post_id = %id, by = %auth.username, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}
