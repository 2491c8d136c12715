//! GlioTarget Web Server
//!
//! Run with: cargo run -p gliotarget-web

use tracing::info;
use tracing_subscriber::EnvFilter;

use gliotarget_web::{config::Config, router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gliotarget=debug,info")),
        )
        .init();

    info!("Starting GlioTarget Aptamer Explorer...");

    let config = Config::load()?;
    let addr = config.server.addr()?;
    info!("Store: {}", config.database.path.display());

    // An unreachable store is fatal here; later failures surface as notices.
    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
