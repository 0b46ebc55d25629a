//! hrp-rc (Recruiter Console) - hiring pipeline stage progression
//!
//! Runs one job command against the upstream pipeline API and prints the
//! result, or serves a read-only board over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use hrp_common::api::ApiClient;
use hrp_common::config::TomlConfig;
use hrp_rc::cli::{execute, Cli, Command};
use hrp_rc::logging;
use hrp_rc::{build_router, AppState, PipelineSession};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = logging::init(cli.log_level.as_deref());
    let config = TomlConfig::resolve(&cli.overrides());
    logging::apply_configured_level(&log_filter, cli.log_level.as_deref(), &config.logging.level);

    info!(
        "Starting HRP Recruiter Console (hrp-rc) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Pipeline API: {}", config.api.base_url);

    let client = ApiClient::new(&config.api).context("Failed to create pipeline API client")?;

    match cli.command {
        Command::Serve { .. } => serve(&config, client).await,
        Command::Job(command) => {
            let mut session = PipelineSession::new(client, command.job_id(), config.session);
            match execute(&mut session, &command).await {
                Ok(output) => {
                    println!("{}", output);
                    Ok(())
                }
                Err(e) => {
                    if e.is_local() {
                        warn!("Command rejected for job {}: {}", command.job_id(), e);
                    } else {
                        error!("Command failed for job {}: {}", command.job_id(), e);
                    }
                    Err(e.into())
                }
            }
        }
    }
}

async fn serve(config: &TomlConfig, client: ApiClient) -> Result<()> {
    let state = AppState::new(Arc::new(client));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.board.bind_address, config.board.port)
        .parse()
        .context("Invalid board bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("hrp-rc listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
