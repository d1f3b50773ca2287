use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) content: String,
    pub(crate) post_id: Uuid,
    pub(crate) author_id: Uuid,
    pub(crate) parent_id: Option<Uuid>,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError>;
    /// Oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError>;
    async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<Comment>, DomainError>;
    async fn soft_delete_comment(&self, id: Uuid) -> Result<bool, DomainError>;
}
