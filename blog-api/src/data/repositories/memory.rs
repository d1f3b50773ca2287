//! Process-local store used by service and router tests. It mirrors the
//! observable behaviour of the Postgres repositories: soft deletes, unique
//! usernames, emails, slugs and category names, newest-first post listing.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::data::Pagination;
use crate::data::Repositories;
use crate::data::category_repository::{CategoryPatch, CategoryRepository, NewCategory};
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserPatch, UserRepository};
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::{Role, User};

struct Stored<T> {
    value: T,
    deleted: bool,
}

impl<T> Stored<T> {
    fn live(value: T) -> Self {
        Self {
            value,
            deleted: false,
        }
    }
}

#[derive(Default)]
struct MemoryState {
    users: Vec<Stored<UserCredentials>>,
    posts: Vec<Stored<Post>>,
    categories: Vec<Stored<Category>>,
    post_categories: Vec<(Uuid, Uuid)>,
    comments: Vec<Stored<Comment>>,
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            posts: Arc::new(self.clone()),
            categories: Arc::new(self.clone()),
            comments: Arc::new(self.clone()),
        }
    }

    /// Inserts an account directly, bypassing hashing. The stored hash never
    /// verifies, so seeded users cannot log in.
    pub(crate) fn seed_user(&self, username: &str, role: Role) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.state().users.push(Stored::live(UserCredentials {
            user: user.clone(),
            password_hash: "unusable".to_string(),
        }));
        user
    }

    /// Every post row, soft-deleted ones included.
    pub(crate) fn all_posts(&self) -> Vec<Post> {
        self.state()
            .posts
            .iter()
            .map(|stored| stored.value.clone())
            .collect()
    }

    pub(crate) fn category_links(&self, post_id: Uuid) -> Vec<Uuid> {
        self.state()
            .post_categories
            .iter()
            .filter(|(linked_post, _)| *linked_post == post_id)
            .map(|(_, category_id)| *category_id)
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store mutex poisoned")
    }
}

fn matches_filter(state: &MemoryState, post: &Post, filter: &PostFilter) -> bool {
    filter.status.is_none_or(|status| post.status == status)
        && filter.author_id.is_none_or(|author_id| post.author_id == author_id)
        && filter.category_id.is_none_or(|category_id| {
            state
                .post_categories
                .contains(&(post.id, category_id))
        })
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.value.user.username == input.username) {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        if state.users.iter().any(|u| u.value.user.email == input.email) {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role,
            created_at: now,
            updated_at: now,
        };
        state.users.push(Stored::live(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        }));
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| !u.deleted && u.value.user.username == username)
            .map(|u| u.value.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| !u.deleted && u.value.user.email == email)
            .map(|u| u.value.clone()))
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| !u.deleted && u.value.user.id == id)
            .map(|u| u.value.user.clone()))
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DomainError> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|u| ids.contains(&u.value.user.id))
            .map(|u| u.value.user.clone())
            .collect())
    }

    async fn list_users(&self, pagination: Pagination) -> Result<Vec<User>, DomainError> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|u| !u.deleted)
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .map(|u| u.value.user.clone())
            .collect())
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, DomainError> {
        let mut state = self.state();
        if state
            .users
            .iter()
            .any(|u| u.value.user.id != id && u.value.user.email == patch.email)
        {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let Some(stored) = state
            .users
            .iter_mut()
            .find(|u| !u.deleted && u.value.user.id == id)
        else {
            return Ok(None);
        };
        let user = &mut stored.value.user;
        user.email = patch.email;
        user.first_name = patch.first_name;
        user.last_name = patch.last_name;
        user.role = patch.role;
        user.updated_at = Utc::now();
        if let Some(password_hash) = patch.password_hash {
            stored.value.password_hash = password_hash;
        }
        Ok(Some(stored.value.user.clone()))
    }

    async fn soft_delete_user(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        match state
            .users
            .iter_mut()
            .find(|u| !u.deleted && u.value.user.id == id)
        {
            Some(stored) => {
                stored.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.state();
        if !state.users.iter().any(|u| u.value.user.id == input.author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }
        if state.posts.iter().any(|p| p.value.slug == input.slug) {
            return Err(DomainError::Unexpected(format!(
                "post write rejected: duplicate slug {}",
                input.slug
            )));
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            slug: input.slug,
            status: input.status,
            author_id: input.author_id,
            published_at: input.published_at,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(Stored::live(post.clone()));
        Ok(post)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self
            .state()
            .posts
            .iter()
            .find(|p| !p.deleted && p.value.id == id)
            .map(|p| p.value.clone()))
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        Ok(self
            .state()
            .posts
            .iter()
            .find(|p| !p.deleted && p.value.slug == slug)
            .map(|p| p.value.clone()))
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, DomainError> {
        Ok(self
            .state()
            .posts
            .iter()
            .any(|p| p.value.slug == slug && Some(p.value.id) != exclude_id))
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut state = self.state();
        if state
            .posts
            .iter()
            .any(|p| p.value.id != id && p.value.slug == patch.slug)
        {
            return Err(DomainError::Unexpected(format!(
                "post write rejected: duplicate slug {}",
                patch.slug
            )));
        }

        let Some(stored) = state
            .posts
            .iter_mut()
            .find(|p| !p.deleted && p.value.id == id)
        else {
            return Ok(None);
        };
        let post = &mut stored.value;
        post.title = patch.title;
        post.content = patch.content;
        post.slug = patch.slug;
        post.status = patch.status;
        post.published_at = patch.published_at;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn soft_delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        match state
            .posts
            .iter_mut()
            .find(|p| !p.deleted && p.value.id == id)
        {
            Some(stored) => {
                stored.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let state = self.state();
        Ok(state
            .posts
            .iter()
            .rev()
            .filter(|p| !p.deleted && matches_filter(&state, &p.value, &filter))
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .map(|p| p.value.clone())
            .collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let state = self.state();
        let count = state
            .posts
            .iter()
            .filter(|p| !p.deleted && matches_filter(&state, &p.value, &filter))
            .count();
        Ok(count as i64)
    }

    async fn attach_category(&self, post_id: Uuid, category_id: Uuid) -> Result<(), DomainError> {
        let mut state = self.state();
        if !state.categories.iter().any(|c| c.value.id == category_id) {
            return Err(DomainError::NotFound("category".to_string()));
        }
        if !state.post_categories.contains(&(post_id, category_id)) {
            state.post_categories.push((post_id, category_id));
        }
        Ok(())
    }

    async fn clear_categories(&self, post_id: Uuid) -> Result<(), DomainError> {
        self.state()
            .post_categories
            .retain(|(linked_post, _)| *linked_post != post_id);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn create_category(&self, input: NewCategory) -> Result<Category, DomainError> {
        let mut state = self.state();
        if state.categories.iter().any(|c| c.value.name == input.name) {
            return Err(DomainError::AlreadyExists("category name".to_string()));
        }
        if state.categories.iter().any(|c| c.value.slug == input.slug) {
            return Err(DomainError::Unexpected(format!(
                "duplicate category slug {}",
                input.slug
            )));
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
            slug: input.slug,
            created_at: now,
            updated_at: now,
        };
        state.categories.push(Stored::live(category.clone()));
        Ok(category)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        Ok(self
            .state()
            .categories
            .iter()
            .find(|c| !c.deleted && c.value.id == id)
            .map(|c| c.value.clone()))
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .state()
            .categories
            .iter()
            .find(|c| !c.deleted && c.value.slug == slug)
            .map(|c| c.value.clone()))
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, DomainError> {
        Ok(self
            .state()
            .categories
            .iter()
            .any(|c| c.value.slug == slug && Some(c.value.id) != exclude_id))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories: Vec<Category> = self
            .state()
            .categories
            .iter()
            .filter(|c| !c.deleted)
            .map(|c| c.value.clone())
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Category>, DomainError> {
        let state = self.state();
        let mut categories: Vec<Category> = state
            .categories
            .iter()
            .filter(|c| !c.deleted && state.post_categories.contains(&(post_id, c.value.id)))
            .map(|c| c.value.clone())
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn update_category(
        &self,
        id: Uuid,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, DomainError> {
        let mut state = self.state();
        if state
            .categories
            .iter()
            .any(|c| c.value.id != id && c.value.name == patch.name)
        {
            return Err(DomainError::AlreadyExists("category name".to_string()));
        }
        if state
            .categories
            .iter()
            .any(|c| c.value.id != id && c.value.slug == patch.slug)
        {
            return Err(DomainError::Unexpected(format!(
                "duplicate category slug {}",
                patch.slug
            )));
        }

        let Some(stored) = state
            .categories
            .iter_mut()
            .find(|c| !c.deleted && c.value.id == id)
        else {
            return Ok(None);
        };
        stored.value.name = patch.name;
        stored.value.slug = patch.slug;
        stored.value.updated_at = Utc::now();
        Ok(Some(stored.value.clone()))
    }

    async fn detach_posts(&self, id: Uuid) -> Result<(), DomainError> {
        self.state()
            .post_categories
            .retain(|(_, category_id)| *category_id != id);
        Ok(())
    }

    async fn soft_delete_category(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        match state
            .categories
            .iter_mut()
            .find(|c| !c.deleted && c.value.id == id)
        {
            Some(stored) => {
                stored.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.state();
        if !state.posts.iter().any(|p| p.value.id == input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        if let Some(parent_id) = input.parent_id
            && !state.comments.iter().any(|c| c.value.id == parent_id)
        {
            return Err(DomainError::Validation {
                field: "parent_id",
                message: "parent comment not found",
            });
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            content: input.content,
            post_id: input.post_id,
            author_id: input.author_id,
            parent_id: input.parent_id,
            created_at: now,
            updated_at: now,
        };
        state.comments.push(Stored::live(comment.clone()));
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError> {
        Ok(self
            .state()
            .comments
            .iter()
            .find(|c| !c.deleted && c.value.id == id)
            .map(|c| c.value.clone()))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        Ok(self
            .state()
            .comments
            .iter()
            .filter(|c| !c.deleted && c.value.post_id == post_id)
            .map(|c| c.value.clone())
            .collect())
    }

    async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<Comment>, DomainError> {
        let mut state = self.state();
        let Some(stored) = state
            .comments
            .iter_mut()
            .find(|c| !c.deleted && c.value.id == id)
        else {
            return Ok(None);
        };
        stored.value.content = content;
        stored.value.updated_at = Utc::now();
        Ok(Some(stored.value.clone()))
    }

    async fn soft_delete_comment(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        match state
            .comments
            .iter_mut()
            .find(|c| !c.deleted && c.value.id == id)
        {
            Some(stored) => {
                stored.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
