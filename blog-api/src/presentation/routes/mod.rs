use axum::Router;

use super::AppState;

pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod comments;
pub(crate) mod posts;
pub(crate) mod users;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let api = Router::new()
        .merge(auth::router())
        .nest("/users", users::router(state.clone()))
        .nest("/posts", posts::router(state.clone()))
        .nest("/categories", categories::router(state.clone()))
        .nest("/comments", comments::router(state));

    Router::new().nest("/api/v1", api)
}
