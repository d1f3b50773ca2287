use std::sync::Arc;

pub(crate) mod category_repository;
pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod user_repository;

use category_repository::CategoryRepository;
use comment_repository::CommentRepository;
use post_repository::PostRepository;
use user_repository::UserRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

impl Pagination {
    pub(crate) const DEFAULT_LIMIT: u32 = 10;
    pub(crate) const MAX_LIMIT: u32 = 100;

    pub(crate) fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

/// Store access handed to the services. Every field is an independent
/// collaborator; calls across them are not transactional.
#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) posts: Arc<dyn PostRepository>,
    pub(crate) categories: Arc<dyn CategoryRepository>,
    pub(crate) comments: Arc<dyn CommentRepository>,
}
