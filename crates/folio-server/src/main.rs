use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use folio_core::site::SiteContent;
use folio_server::{config::Config, state::AppState};

/// `folio health`: liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$FOLIO_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("FOLIO_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("folio=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let site = SiteContent::load(cfg.site_config_path.as_deref())?;
    info!(
        source = cfg.site_config_path.as_deref().unwrap_or("builtin"),
        projects = site.projects.len(),
        featured = site.featured_projects().count(),
        "Site content loaded"
    );

    if cfg.llm.api_key.is_none() {
        warn!("GROQ_API_KEY not set. Chat requests will fail at the provider.");
    }
    info!(policy = ?cfg.client_id_policy, "Client identifier policy");

    let addr = format!("0.0.0.0:{}", cfg.port);
    let state = Arc::new(AppState::new(cfg.clone(), site)?);
    let app = folio_server::app::build_app(state);

    info!(port = cfg.port, model = %cfg.llm.model, "Folio listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
