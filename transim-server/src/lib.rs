//! HTTP/JSON front-end of the transit simulator

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{Args, HttpConfig, ServerConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the default `info` level. Records emitted
/// through the `log` facade by the core are captured as well.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
