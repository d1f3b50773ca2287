use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Directive used when `RUST_LOG` is unset: the service and request traces at
/// `level`, sqlx statement logging only for slow or failed queries.
fn default_directive(level: &str) -> String {
    format!("blog_api={level},tower_http={level},sqlx=warn")
}

pub(crate) fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(level)))
        .unwrap_or_else(|_| EnvFilter::new(default_directive("info")));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::default_directive;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn default_directive_parses() {
        let directive = default_directive("debug");
        assert!(directive.starts_with("blog_api=debug"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
