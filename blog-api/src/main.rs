use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use data::repositories::postgres;
use domain::user::RegisterRequest;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let repos = postgres::repositories(pool);
    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
        &settings.jwt_issuer,
    ));
    let state = AppState::new(&repos, jwt);

    if let Some(admin) = settings.bootstrap_admin.clone() {
        bootstrap_admin(&state.auth_service, admin).await?;
    }

    info!(addr = %settings.http_addr, "starting blog-api");
    server::run_http(&settings, state).await
}

async fn bootstrap_admin(
    auth: &AuthService,
    admin: infrastructure::settings::AdminAccount,
) -> Result<()> {
    auth.ensure_admin(RegisterRequest {
        username: admin.username,
        email: admin.email,
        password: admin.password,
        first_name: String::new(),
        last_name: String::new(),
    })
    .await
    .context("failed to create bootstrap admin")?;
    Ok(())
}
