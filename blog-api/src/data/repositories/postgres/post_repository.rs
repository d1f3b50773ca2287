use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION, violated_constraint};
use crate::data::Pagination;
use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    content: String,
    slug: String,
    status: String,
    author_id: Uuid,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, title, content, slug, status, author_id, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, content, slug, status, author_id, published_at, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.slug)
        .bind(input.status.as_str())
        .bind(input.author_id)
        .bind(input.published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
            id,
            title,
            content,
            slug,
            status,
            author_id,
            published_at,
            created_at,
            updated_at
            FROM posts
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
            id,
            title,
            content,
            slug,
            status,
            author_id,
            published_at,
            created_at,
            updated_at
            FROM posts
            WHERE slug = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM posts
                WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(exists)
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = $2,
                content = $3,
                slug = $4,
                status = $5,
                published_at = $6,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, title, content, slug, status, author_id, published_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.slug)
        .bind(patch.status.as_str())
        .bind(patch.published_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn soft_delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                p.id,
                p.title,
                p.content,
                p.slug,
                p.status,
                p.author_id,
                p.published_at,
                p.created_at,
                p.updated_at
            FROM posts p
            WHERE p.deleted_at IS NULL
              AND ($1::text IS NULL OR p.status = $1)
              AND ($2::uuid IS NULL OR p.author_id = $2)
              AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM post_categories pc
                    WHERE pc.post_id = p.id AND pc.category_id = $3
                  ))
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $4
            OFFSET $5
            "#,
        )
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.author_id)
        .bind(filter.category_id)
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts p
            WHERE p.deleted_at IS NULL
              AND ($1::text IS NULL OR p.status = $1)
              AND ($2::uuid IS NULL OR p.author_id = $2)
              AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM post_categories pc
                    WHERE pc.post_id = p.id AND pc.category_id = $3
                  ))
            "#,
        )
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.author_id)
        .bind(filter.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(count)
    }

    async fn attach_category(&self, post_id: Uuid, category_id: Uuid) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO post_categories (post_id, category_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(category_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(())
    }

    async fn clear_categories(&self, post_id: Uuid) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            DELETE FROM post_categories
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(())
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let status = row
        .status
        .parse()
        .map_err(|err: DomainError| DomainError::Unexpected(err.to_string()))?;

    Ok(Post {
        id: row.id,
        title: row.title,
        content: row.content,
        slug: row.slug,
        status,
        author_id: row.author_id,
        published_at: row.published_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let Some(constraint) = violated_constraint(&err, FOREIGN_KEY_VIOLATION) {
        let resource = match constraint.as_str() {
            "post_categories_category_id_fkey" => "category",
            "post_categories_post_id_fkey" => "post",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    // A slug race lost against the unique index ends up here: report a plain
    // failure rather than a conflict the client could act on.
    if violated_constraint(&err, UNIQUE_VIOLATION).is_some() {
        return DomainError::Unexpected(format!("post write rejected: {err}"));
    }
    DomainError::Unexpected(err.to_string())
}
