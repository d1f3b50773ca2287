pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod category_service;
pub(crate) mod comment_service;
pub(crate) mod user_service;
