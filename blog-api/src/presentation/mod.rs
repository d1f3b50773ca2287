use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::category_service::CategoryService;
use crate::application::comment_service::CommentService;
use crate::application::user_service::UserService;
use crate::data::Repositories;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;


#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService>,
    pub(crate) user_service: Arc<UserService>,
    pub(crate) blog_service: Arc<BlogService>,
    pub(crate) category_service: Arc<CategoryService>,
    pub(crate) comment_service: Arc<CommentService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(repos: &Repositories, jwt: Arc<JwtService>) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(repos.users.clone(), jwt.clone())),
            user_service: Arc::new(UserService::new(repos.users.clone())),
            blog_service: Arc::new(BlogService::new(repos)),
            category_service: Arc::new(CategoryService::new(repos.categories.clone())),
            comment_service: Arc::new(CommentService::new(repos)),
            jwt,
        }
    }
}
