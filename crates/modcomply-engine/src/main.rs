//! modcomply engine daemon.
//!
//! - Loads `modcomply.yaml` (or the path given as first argument)
//! - Deploys and binds the configured policy modules
//! - Serves read-only queries, health, and metrics until Ctrl-C

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use modcomply_engine::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "modcomply-engine failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "modcomply.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.engine.listen.parse()?;

    let state = app_state::AppState::new(cfg)?;
    let engine = state.engine();
    tracing::info!(%listen, engine = %engine.address(), modules = engine.modules()?.len(), "modcomply-engine starting");

    let app = router::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(listen).await?;

    let metrics = state.metrics();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            metrics.set_draining();
            tracing::info!("shutdown requested, draining");
        })
        .await?;
    Ok(())
}
