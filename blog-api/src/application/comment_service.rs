use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::data::Repositories;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{
    Comment, CommentThread, CreateCommentRequest, UpdateCommentRequest, ensure_reply_depth,
    thread_comments,
};
use crate::domain::error::DomainError;
use crate::domain::policy::{Actor, publicly_visible};
use crate::domain::post::Post;
use crate::domain::user::User;

pub(crate) struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl CommentService {
    pub(crate) fn new(repos: &Repositories) -> Self {
        Self {
            comments: repos.comments.clone(),
            posts: repos.posts.clone(),
            users: repos.users.clone(),
        }
    }

    /// Threaded comments of a published post.
    pub(crate) async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentThread>, DomainError> {
        self.load_visible_post(post_id).await?;
        load_threads(self.comments.as_ref(), self.users.as_ref(), post_id).await
    }

    /// A comment together with every reply below it.
    pub(crate) async fn get_comment(&self, comment_id: Uuid) -> Result<CommentThread, DomainError> {
        let comment = self.load(comment_id).await?;
        let threads =
            load_threads(self.comments.as_ref(), self.users.as_ref(), comment.post_id).await?;

        CommentThread::find(threads, comment_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    pub(crate) async fn create_comment(
        &self,
        actor: Actor,
        post_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<CommentThread, DomainError> {
        let req = req.validate()?;

        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        if !publicly_visible(post.status) {
            return Err(DomainError::invalid(
                "post_id",
                "cannot comment on unpublished posts",
            ));
        }

        if let Some(parent_id) = req.parent_id {
            let parent = self
                .comments
                .get_comment(parent_id)
                .await?
                .ok_or(DomainError::invalid("parent_id", "parent comment not found"))?;
            parent.accepts_reply_on(post.id)?;
            self.ensure_nesting_allowed(&parent).await?;
        }

        let comment = self
            .comments
            .create_comment(NewComment {
                content: req.content,
                post_id: post.id,
                author_id: actor.id,
                parent_id: req.parent_id,
            })
            .await?;

        self.single(comment).await
    }

    pub(crate) async fn update_comment(
        &self,
        actor: Actor,
        comment_id: Uuid,
        req: UpdateCommentRequest,
    ) -> Result<CommentThread, DomainError> {
        let req = req.validate()?;
        let current = self.load(comment_id).await?;
        actor.authorize_owner(current.author_id)?;

        let comment = self
            .comments
            .update_comment(comment_id, req.content)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;

        self.single(comment).await
    }

    pub(crate) async fn delete_comment(&self, actor: Actor, comment_id: Uuid) -> Result<(), DomainError> {
        let current = self.load(comment_id).await?;
        actor.authorize_owner(current.author_id)?;

        if !self.comments.soft_delete_comment(comment_id).await? {
            return Err(DomainError::not_found("comment", comment_id));
        }
        Ok(())
    }

    /// Walks up from `parent` to reject a reply that would sit deeper than
    /// the cap. A deleted ancestor ends the chain, as it does when threads are
    /// built, and the walk never takes more steps than the cap allows.
    async fn ensure_nesting_allowed(&self, parent: &Comment) -> Result<(), DomainError> {
        let mut depth = 1;
        let mut ancestor = parent.parent_id;
        while let Some(ancestor_id) = ancestor {
            let Some(comment) = self.comments.get_comment(ancestor_id).await? else {
                break;
            };
            depth += 1;
            ensure_reply_depth(depth)?;
            ancestor = comment.parent_id;
        }
        Ok(())
    }

    async fn load(&self, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    async fn load_visible_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .filter(|post| publicly_visible(post.status))
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn single(&self, comment: Comment) -> Result<CommentThread, DomainError> {
        let author = self.users.get_user(comment.author_id).await?;
        Ok(CommentThread {
            comment,
            author,
            replies: Vec::new(),
        })
    }
}

/// Loads the live comments of a post with their authors and arranges them
/// into reply trees.
pub(crate) async fn load_threads(
    comments: &dyn CommentRepository,
    users: &dyn UserRepository,
    post_id: Uuid,
) -> Result<Vec<CommentThread>, DomainError> {
    let comments = comments.list_for_post(post_id).await?;

    let mut author_ids: Vec<Uuid> = comments.iter().map(|comment| comment.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors: HashMap<Uuid, User> = users
        .find_users(&author_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    let entries = comments
        .into_iter()
        .map(|comment| {
            let author = authors.get(&comment.author_id).cloned();
            (comment, author)
        })
        .collect();

    Ok(thread_comments(entries))
}
