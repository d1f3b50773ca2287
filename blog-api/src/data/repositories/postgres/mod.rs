use std::sync::Arc;

use sqlx::PgPool;

use crate::data::Repositories;

pub(crate) mod category_repository;
pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod user_repository;

use category_repository::PostgresCategoryRepository;
use comment_repository::PostgresCommentRepository;
use post_repository::PostgresPostRepository;
use user_repository::PostgresUserRepository;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub(crate) fn repositories(pool: PgPool) -> Repositories {
    Repositories {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        posts: Arc::new(PostgresPostRepository::new(pool.clone())),
        categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
        comments: Arc::new(PostgresCommentRepository::new(pool)),
    }
}

/// Name of the constraint behind a database error with the given SQLSTATE.
fn violated_constraint(err: &sqlx::Error, code: &str) -> Option<String> {
    if let sqlx::Error::Database(db_err) = err
        && db_err.code().as_deref() == Some(code)
    {
        return Some(db_err.constraint().unwrap_or_default().to_string());
    }
    None
}
