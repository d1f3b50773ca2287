use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Pagination;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStatus};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: String,
    pub(crate) status: PostStatus,
    pub(crate) author_id: Uuid,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

/// Full-record save of the mutable post columns.
#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: String,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PostFilter {
    pub(crate) status: Option<PostStatus>,
    pub(crate) author_id: Option<Uuid>,
    pub(crate) category_id: Option<Uuid>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError>;
    /// Looks at every post ever stored, soft-deleted ones included.
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, DomainError>;
    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn soft_delete_post(&self, id: Uuid) -> Result<bool, DomainError>;
    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError>;
    async fn attach_category(&self, post_id: Uuid, category_id: Uuid) -> Result<(), DomainError>;
    async fn clear_categories(&self, post_id: Uuid) -> Result<(), DomainError>;
}
