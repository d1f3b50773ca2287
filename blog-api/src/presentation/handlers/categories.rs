use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::posts::ListPostsResponseDto;
use super::{PaginationQuery, parse_id};
use crate::domain::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCategoryDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) name: String,
    #[validate(length(max = 255))]
    pub(crate) slug: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateCategoryDto {
    #[validate(length(max = 255))]
    pub(crate) name: Option<String>,
    #[validate(length(max = 255))]
    pub(crate) slug: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories listed", body = [CategoryDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<CategoryDto>>)> {
    let categories = state.category_service.list_categories().await?;
    Ok((
        StatusCode::OK,
        Json(categories.into_iter().map(CategoryDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryDto),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    let id = parse_id(&id, "category")?;
    let category = state.category_service.get_category(id).await?;
    Ok((StatusCode::OK, Json(CategoryDto::from(category))))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/slug/{slug}",
    tag = "categories",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryDto),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    let category = state.category_service.get_category_by_slug(&slug).await?;
    Ok((StatusCode::OK, Json(CategoryDto::from(category))))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/posts",
    tag = "categories",
    params(
        ("id" = Uuid, Path, description = "Category id"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Published posts of the category", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_category_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    let id = parse_id(&id, "category")?;
    let pagination = query.pagination()?;
    let result = state.blog_service.list_by_category(id, pagination).await?;
    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Category name already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreateCategoryDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    dto.validate()?;
    let req = CreateCategoryRequest {
        name: dto.name,
        slug: dto.slug,
    };

    let category = state
        .category_service
        .create_category(auth.actor(), req)
        .await?;
    info!(category_id = %category.id, by = %auth.username, "category created");
    Ok((StatusCode::CREATED, Json(CategoryDto::from(category))))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category name already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    Json(dto): Json<UpdateCategoryDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    let id = parse_id(&id, "category")?;
    dto.validate()?;
    let req = UpdateCategoryRequest {
        name: dto.name,
        slug: dto.slug,
    };

    let category = state
        .category_service
        .update_category(auth.actor(), id, req)
        .await?;
    Ok((StatusCode::OK, Json(CategoryDto::from(category))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Invalid id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, "category")?;
    state
        .category_service
        .delete_category(auth.actor(), id)
        .await?;
    info!(category_id = %id, by = %auth.username, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
