use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::PaginationQuery;
use crate::presentation::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto};
use crate::presentation::handlers::categories::{
    CategoryDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::presentation::handlers::comments::{CommentDto, CreateCommentDto, UpdateCommentDto};
use crate::presentation::handlers::posts::{
    CreatePostDto, ListPostsResponseDto, PostDetailsDto, PostDto, UpdatePostDto,
};
use crate::presentation::handlers::users::{AuthorDto, UpdateUserDto, UserDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::users::me,
        crate::presentation::handlers::users::list_users,
        crate::presentation::handlers::users::update_user,
        crate::presentation::handlers::users::delete_user,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::get_post_by_slug,
        crate::presentation::handlers::posts::list_user_posts,
        crate::presentation::handlers::posts::list_own_posts,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::categories::list_categories,
        crate::presentation::handlers::categories::get_category,
        crate::presentation::handlers::categories::get_category_by_slug,
        crate::presentation::handlers::categories::list_category_posts,
        crate::presentation::handlers::categories::create_category,
        crate::presentation::handlers::categories::update_category,
        crate::presentation::handlers::categories::delete_category,
        crate::presentation::handlers::comments::list_post_comments,
        crate::presentation::handlers::comments::get_comment,
        crate::presentation::handlers::comments::create_comment,
        crate::presentation::handlers::comments::update_comment,
        crate::presentation::handlers::comments::delete_comment
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            AuthorDto,
            UpdateUserDto,
            PaginationQuery,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            PostDetailsDto,
            ListPostsResponseDto,
            CategoryDto,
            CreateCategoryDto,
            UpdateCategoryDto,
            CommentDto,
            CreateCommentDto,
            UpdateCommentDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User profiles"),
        (name = "posts", description = "Post endpoints"),
        (name = "categories", description = "Category endpoints"),
        (name = "comments", description = "Threaded comments")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
