mod config;
mod enrich;
mod image_search;
mod server;
mod valuation;
mod vehicle;

pub const USER_AGENT: &str = concat!("carlens/", env!("CARGO_PKG_VERSION"));

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use config::Args;
use server::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carlens=info".parse()?),
        )
        .init();

    if let Ok(path) = &dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let args = Args::parse();
    let allowed_origin = args.allowed_origin.parse()?;

    let state = AppState::from_args(server::http_client()?, &args);
    info!(
        sites = state.config.sites.len(),
        quota = state.config.quota,
        merge_policy = ?state.config.merge_policy,
        "starting carlens"
    );

    let app = server::router(Arc::new(state), allowed_origin);
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(addr = %args.bind, "listening");

    axum::serve(listener, app)
        .await
        .inspect_err(|e| tracing::error!("server error: {e}"))?;

    info!("server stopped");
    Ok(())
}
