pub mod api; // Local HTTP surface
pub mod catalog;
pub mod config;
pub mod form; // Form state + completion gate
pub mod models;
pub mod normalize;
pub mod patient_id;
pub mod report; // Assembly, validation, PDF export
pub mod state;
pub mod views; // HTML form and print pages

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
    #[error("Cannot listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

/// Initialize tracing; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load configuration, serve until Ctrl-C, then shut down gracefully.
pub async fn run() -> Result<(), RunError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::load()?;
    let addr = config.socket_addr();
    tracing::info!(
        %addr,
        form_mode = %config.form_mode,
        report_capacity = config.report_capacity,
        "configuration ready"
    );

    let state = Arc::new(state::AppState::new(config));
    let mut server = api::start_server(state, addr).await?;
    tracing::info!("Lab form available at http://{}/lab-form", server.session.server_addr);

    tokio::signal::ctrl_c().await.map_err(RunError::Signal)?;
    server.shutdown();
    server.wait().await?;
    Ok(())
}
