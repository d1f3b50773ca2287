use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::infrastructure::settings::Settings;

/// How long browsers may cache a preflight answer.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

fn allowed_origins(origins: &[String]) -> Result<AllowOrigin> {
    if origins.iter().any(|origin| origin.trim() == "*") {
        return Ok(AllowOrigin::from(Any));
    }

    let mut parsed = Vec::with_capacity(origins.len());
    for origin in origins.iter().map(|origin| origin.trim()) {
        if origin.is_empty() {
            continue;
        }
        let value = origin
            .parse::<HeaderValue>()
            .with_context(|| format!("invalid CORS origin {origin:?}"))?;
        if !parsed.contains(&value) {
            parsed.push(value);
        }
    }
    Ok(AllowOrigin::list(parsed))
}

pub(crate) fn build_cors_layer(origins: &[String]) -> Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(allowed_origins(origins)?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(PREFLIGHT_MAX_AGE))
}

pub(crate) fn apply_cors(router: Router, settings: &Settings) -> Result<Router> {
    Ok(router.layer(build_cors_layer(&settings.cors_origins)?))
}
