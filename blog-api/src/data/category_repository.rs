use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::category::Category;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewCategory {
    pub(crate) name: String,
    pub(crate) slug: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryPatch {
    pub(crate) name: String,
    pub(crate) slug: String,
}

#[async_trait]
pub(crate) trait CategoryRepository: Send + Sync {
    async fn create_category(&self, input: NewCategory) -> Result<Category, DomainError>;
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, DomainError>;
    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, DomainError>;
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Category>, DomainError>;
    async fn update_category(
        &self,
        id: Uuid,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, DomainError>;
    async fn detach_posts(&self, id: Uuid) -> Result<(), DomainError>;
    async fn soft_delete_category(&self, id: Uuid) -> Result<bool, DomainError>;
}
