//! symptom-server: two-page symptom checker binary entrypoint.

use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use symptom_server::config::Config;
use symptom_server::state::AppState;

/// How often idle sessions are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();

    // Log startup info
    if config.openai_api_key.is_some() {
        tracing::info!(model = %config.openai_model, "OpenAI API key configured");
    } else {
        tracing::warn!("OPENAI_API_KEY not set, assessments will report an error");
    }
    tracing::info!("Rate limiting: {} assessments/second", config.rate_limit_rps);

    let state = AppState::from_config(&config);
    state
        .sessions
        .spawn_sweeper(config.session_idle, SWEEP_INTERVAL);

    // Build application
    let app = symptom_server::build_app(state, &config);

    // Start server
    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        tracing::error!(address = %config.bind_address, error = %e, "Invalid bind address");
        e
    })?;
    tracing::info!("Starting symptom checker on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
