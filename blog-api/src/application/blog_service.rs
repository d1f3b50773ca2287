use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use super::comment_service::load_threads;
use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::data::{Pagination, Repositories};
use crate::domain::category::Category;
use crate::domain::comment::CommentThread;
use crate::domain::error::DomainError;
use crate::domain::policy::{Actor, publicly_visible};
use crate::domain::post::{
    CreatePostRequest, Post, PostStatus, UpdatePostRequest, stamp_published_at,
};
use crate::domain::slug::{slugify, with_random_suffix};
use crate::domain::user::User;

/// A post with the relations shown in listings.
#[derive(Debug, Clone)]
pub(crate) struct PostSummary {
    pub(crate) post: Post,
    pub(crate) author: Option<User>,
    pub(crate) categories: Vec<Category>,
}

/// A post with every relation loaded, comments threaded.
#[derive(Debug, Clone)]
pub(crate) struct PostDetails {
    pub(crate) post: Post,
    pub(crate) author: Option<User>,
    pub(crate) categories: Vec<Category>,
    pub(crate) comments: Vec<CommentThread>,
}

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<PostSummary>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) total: i64,
}

pub(crate) struct BlogService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl BlogService {
    pub(crate) fn new(repos: &Repositories) -> Self {
        Self {
            posts: repos.posts.clone(),
            users: repos.users.clone(),
            categories: repos.categories.clone(),
            comments: repos.comments.clone(),
        }
    }

    pub(crate) async fn create_post(
        &self,
        actor: Actor,
        req: CreatePostRequest,
    ) -> Result<PostDetails, DomainError> {
        let req = req.validate()?;

        let slug = self.allocate_slug(req.slug_source(), None).await?;
        let status = req.status.unwrap_or_default();
        let new_post = NewPost {
            published_at: stamp_published_at(status, None, Utc::now()),
            title: req.title,
            content: req.content,
            slug,
            status,
            author_id: actor.id,
        };
        let post = self.posts.create_post(new_post).await?;

        self.attach_categories(post.id, &req.category_ids).await;
        self.details(post).await
    }

    /// Published post by id. Drafts are reported as missing.
    pub(crate) async fn get_post(&self, post_id: Uuid) -> Result<PostDetails, DomainError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .filter(|post| publicly_visible(post.status))
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        self.details(post).await
    }

    pub(crate) async fn get_post_by_slug(&self, slug: &str) -> Result<PostDetails, DomainError> {
        let post = self
            .posts
            .get_post_by_slug(slug)
            .await?
            .filter(|post| publicly_visible(post.status))
            .ok_or_else(|| DomainError::not_found("post", slug))?;
        self.details(post).await
    }

    pub(crate) async fn list_posts(
        &self,
        pagination: Pagination,
    ) -> Result<ListPostsResult, DomainError> {
        let filter = PostFilter {
            status: Some(PostStatus::Published),
            ..PostFilter::default()
        };
        self.list(filter, pagination).await
    }

    pub(crate) async fn list_by_author(
        &self,
        author_id: Uuid,
        pagination: Pagination,
    ) -> Result<ListPostsResult, DomainError> {
        let filter = PostFilter {
            status: Some(PostStatus::Published),
            author_id: Some(author_id),
            ..PostFilter::default()
        };
        self.list(filter, pagination).await
    }

    /// The caller's own posts, drafts included.
    pub(crate) async fn list_own(
        &self,
        actor: Actor,
        status: Option<PostStatus>,
        pagination: Pagination,
    ) -> Result<ListPostsResult, DomainError> {
        let filter = PostFilter {
            status,
            author_id: Some(actor.id),
            ..PostFilter::default()
        };
        self.list(filter, pagination).await
    }

    pub(crate) async fn list_by_category(
        &self,
        category_id: Uuid,
        pagination: Pagination,
    ) -> Result<ListPostsResult, DomainError> {
        self.categories
            .get_category(category_id)
            .await?
            .ok_or_else(|| DomainError::not_found("category", category_id))?;

        let filter = PostFilter {
            status: Some(PostStatus::Published),
            category_id: Some(category_id),
            ..PostFilter::default()
        };
        self.list(filter, pagination).await
    }

    pub(crate) async fn update_post(
        &self,
        actor: Actor,
        post_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<PostDetails, DomainError> {
        let req = req.validate()?;
        let current = self.load(post_id).await?;
        actor.authorize_owner(current.author_id)?;

        let slug = match req.slug_source(&current) {
            Some(source) => self.allocate_slug(source, Some(current.id)).await?,
            None => current.slug.clone(),
        };
        let status = req.status.unwrap_or(current.status);
        let patch = PostPatch {
            title: req.title.unwrap_or(current.title),
            content: req.content.unwrap_or(current.content),
            slug,
            status,
            published_at: stamp_published_at(status, current.published_at, Utc::now()),
        };

        let post = self
            .posts
            .update_post(post_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        if let Some(category_ids) = req.category_ids {
            self.posts.clear_categories(post.id).await?;
            self.attach_categories(post.id, &category_ids).await;
        }

        self.details(post).await
    }

    pub(crate) async fn delete_post(&self, actor: Actor, post_id: Uuid) -> Result<(), DomainError> {
        let current = self.load(post_id).await?;
        actor.authorize_owner(current.author_id)?;

        if !self.posts.soft_delete_post(post_id).await? {
            return Err(DomainError::not_found("post", post_id));
        }
        Ok(())
    }

    async fn load(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn list(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<ListPostsResult, DomainError> {
        let posts = self.posts.list_posts(filter, pagination).await?;
        let total = self.posts.count_posts(filter).await?;

        let mut author_ids: Vec<Uuid> = posts.iter().map(|post| post.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors: HashMap<Uuid, User> = self
            .users
            .find_users(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let mut summaries = Vec::with_capacity(posts.len());
        for post in posts {
            let categories = self.categories.list_for_post(post.id).await?;
            summaries.push(PostSummary {
                author: authors.get(&post.author_id).cloned(),
                categories,
                post,
            });
        }

        Ok(ListPostsResult {
            posts: summaries,
            limit: pagination.limit,
            offset: pagination.offset,
            total,
        })
    }

    async fn details(&self, post: Post) -> Result<PostDetails, DomainError> {
        let author = self
            .users
            .find_users(&[post.author_id])
            .await?
            .into_iter()
            .next();
        let categories = self.categories.list_for_post(post.id).await?;
        let comments = load_threads(self.comments.as_ref(), self.users.as_ref(), post.id).await?;

        Ok(PostDetails {
            post,
            author,
            categories,
            comments,
        })
    }

    /// Slugifies `source` and appends a random suffix when the result is
    /// empty or already used by another post.
    async fn allocate_slug(
        &self,
        source: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<String, DomainError> {
        let base = slugify(source);
        if base.is_empty() || self.posts.slug_exists(&base, exclude_id).await? {
            return Ok(with_random_suffix(&base));
        }
        Ok(base)
    }

    /// Links every existing category in `category_ids`. Unknown ids and
    /// failed links are skipped.
    async fn attach_categories(&self, post_id: Uuid, category_ids: &[Uuid]) {
        let mut seen = Vec::with_capacity(category_ids.len());
        for &category_id in category_ids {
            if seen.contains(&category_id) {
                continue;
            }
            seen.push(category_id);

            match self.categories.get_category(category_id).await {
                Ok(Some(_)) => {}
                Ok(None) => continue,
                Err(err) => {
                    warn!(%post_id, %category_id, error = %err, "category lookup failed");
                    continue;
                }
            }
            if let Err(err) = self.posts.attach_category(post_id, category_id).await {
                warn!(%post_id, %category_id, error = %err, "failed to attach category");
            }
        }
    }
}
