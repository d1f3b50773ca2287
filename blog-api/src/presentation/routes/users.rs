use axum::Router;
use axum::middleware;
use axum::routing::{get, put};

use crate::presentation::AppState;
use crate::presentation::handlers::users::{delete_user, list_users, me, update_user};
use crate::presentation::middleware::auth::{ADMIN_ONLY, jwt_auth_middleware, require_role};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(list_users))
        .layer(middleware::from_fn_with_state(ADMIN_ONLY, require_role))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let protected = Router::new()
        .route("/me", get(me))
        .route("/{id}", put(update_user).delete(delete_user))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    admin.merge(protected)
}
