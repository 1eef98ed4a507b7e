use std::sync::Arc;

use clap::Parser;
use tracing::info;
use transim_core::prelude::{SimulationEngine, create_network};
use transim_server::{AppState, Args, ServerConfig, create_router, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let config = ServerConfig::from_args(&args)?;

    let store = create_network(&config.network)?;
    let engine = Arc::new(SimulationEngine::with_source(
        &store,
        config.simulation.clone(),
    ));
    engine.start()?;

    let mut state = AppState::new(store, Arc::clone(&engine));
    if let Some(path) = &config.network.path {
        info!("Admin edits are saved to {}", path.display());
        state = state.with_network_file(path.clone());
    }
    let app = create_router(state, &config.server);

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    engine.stop();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
