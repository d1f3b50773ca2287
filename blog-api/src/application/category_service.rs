use std::sync::Arc;

use uuid::Uuid;

use crate::data::category_repository::{CategoryPatch, CategoryRepository, NewCategory};
use crate::domain::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::domain::error::DomainError;
use crate::domain::policy::Actor;
use crate::domain::slug::{slugify, with_random_suffix};

pub(crate) struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub(crate) fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub(crate) async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list_categories().await
    }

    pub(crate) async fn get_category(&self, category_id: Uuid) -> Result<Category, DomainError> {
        self.categories
            .get_category(category_id)
            .await?
            .ok_or_else(|| DomainError::not_found("category", category_id))
    }

    pub(crate) async fn get_category_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        self.categories
            .get_category_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("category", slug))
    }

    pub(crate) async fn create_category(
        &self,
        actor: Actor,
        req: CreateCategoryRequest,
    ) -> Result<Category, DomainError> {
        let req = req.validate()?;
        actor.authorize_admin()?;

        let slug = self.allocate_slug(req.slug_source(), None).await?;
        self.categories
            .create_category(NewCategory {
                name: req.name,
                slug,
            })
            .await
    }

    pub(crate) async fn update_category(
        &self,
        actor: Actor,
        category_id: Uuid,
        req: UpdateCategoryRequest,
    ) -> Result<Category, DomainError> {
        let req = req.validate()?;
        let current = self.get_category(category_id).await?;
        actor.authorize_admin()?;

        let slug = match req.slug_source(&current) {
            Some(source) => self.allocate_slug(source, Some(current.id)).await?,
            None => current.slug.clone(),
        };
        let patch = CategoryPatch {
            name: req.name.unwrap_or(current.name),
            slug,
        };

        self.categories
            .update_category(category_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("category", category_id))
    }

    /// Unlinks the category from its posts, then soft-deletes it.
    pub(crate) async fn delete_category(
        &self,
        actor: Actor,
        category_id: Uuid,
    ) -> Result<(), DomainError> {
        let current = self.get_category(category_id).await?;
        actor.authorize_admin()?;

        self.categories.detach_posts(current.id).await?;
        if !self.categories.soft_delete_category(current.id).await? {
            return Err(DomainError::not_found("category", category_id));
        }
        Ok(())
    }

    async fn allocate_slug(
        &self,
        source: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<String, DomainError> {
        let base = slugify(source);
        if base.is_empty() || self.categories.slug_exists(&base, exclude_id).await? {
            return Ok(with_random_suffix(&base));
        }
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::CategoryService;
    use crate::data::post_repository::{NewPost, PostRepository};
    use crate::data::repositories::memory::InMemoryStore;
    use crate::domain::category::{CreateCategoryRequest, UpdateCategoryRequest};
    use crate::domain::error::DomainError;
    use crate::domain::policy::Actor;
    use crate::domain::post::PostStatus;
    use crate::domain::user::Role;

    fn create_request(name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            slug: None,
        }
    }

    #[tokio::test]
    async fn only_admin_can_create() {
        let store = InMemoryStore::new();
        let service = CategoryService::new(Arc::new(store.clone()));
        let user = store.seed_user("writer", Role::User);
        let admin = store.seed_user("root", Role::Admin);

        let err = service
            .create_category(Actor::new(user.id, user.role), create_request("Rust"))
            .await
            .expect_err("non-admin must be rejected");
        assert!(matches!(err, DomainError::Forbidden));

        let created = service
            .create_category(Actor::new(admin.id, admin.role), create_request("Rust Tips"))
            .await
            .expect("admin must create");
        assert_eq!(created.slug, "rust-tips");
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict_and_colliding_slug_gets_suffix() {
        let store = InMemoryStore::new();
        let service = CategoryService::new(Arc::new(store.clone()));
        let admin = store.seed_user("root", Role::Admin);
        let actor = Actor::new(admin.id, admin.role);

        service
            .create_category(actor, create_request("Rust"))
            .await
            .expect("first category must be created");

        let err = service
            .create_category(actor, create_request("Rust"))
            .await
            .expect_err("duplicate name must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));

        let other = service
            .create_category(
                actor,
                CreateCategoryRequest {
                    name: "Rust language".to_string(),
                    slug: Some("rust".to_string()),
                },
            )
            .await
            .expect("second category must be created");
        assert!(other.slug.starts_with("rust-"));
        assert_eq!(other.slug.len(), "rust-".len() + 8);
    }

    #[tokio::test]
    async fn missing_category_is_not_found_before_permission() {
        let store = InMemoryStore::new();
        let service = CategoryService::new(Arc::new(store.clone()));
        let user = store.seed_user("writer", Role::User);

        let err = service
            .update_category(
                Actor::new(user.id, user.role),
                Uuid::new_v4(),
                UpdateCategoryRequest::default(),
            )
            .await
            .expect_err("missing category must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn rename_regenerates_slug() {
        let store = InMemoryStore::new();
        let service = CategoryService::new(Arc::new(store.clone()));
        let admin = store.seed_user("root", Role::Admin);
        let actor = Actor::new(admin.id, admin.role);

        let created = service
            .create_category(actor, create_request("Old Name"))
            .await
            .expect("category must be created");
        let renamed = service
            .update_category(
                actor,
                created.id,
                UpdateCategoryRequest {
                    name: Some("New Name".to_string()),
                    slug: None,
                },
            )
            .await
            .expect("rename must succeed");

        assert_eq!(renamed.slug, "new-name");
        let by_slug = service
            .get_category_by_slug("new-name")
            .await
            .expect("lookup by new slug must succeed");
        assert_eq!(by_slug.id, created.id);
    }

    #[tokio::test]
    async fn delete_detaches_posts() {
        let store = InMemoryStore::new();
        let service = CategoryService::new(Arc::new(store.clone()));
        let admin = store.seed_user("root", Role::Admin);
        let actor = Actor::new(admin.id, admin.role);

        let category = service
            .create_category(actor, create_request("Rust"))
            .await
            .expect("category must be created");
        let post = store
            .create_post(NewPost {
                title: "Post".to_string(),
                content: "Body".to_string(),
                slug: "post".to_string(),
                status: PostStatus::Published,
                author_id: admin.id,
                published_at: None,
            })
            .await
            .expect("post must be stored");
        store
            .attach_category(post.id, category.id)
            .await
            .expect("link must be stored");

        service
            .delete_category(actor, category.id)
            .await
            .expect("delete must succeed");

        assert!(store.category_links(post.id).is_empty());
        let err = service
            .get_category(category.id)
            .await
            .expect_err("deleted category must be gone");
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
