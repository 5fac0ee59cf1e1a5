use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use scamguard::config::{AppConfig, LoggingConfig};
use scamguard::generation::{GenerationGateway, OpenAiClient};
use scamguard::http::{AppState, HttpServer};
use scamguard::quiz::{MemoryLeaderboard, QuizCatalog};
use scamguard::ratelimit::{AdmissionController, RateLimitRegistry, SweepTask, SystemClock};
use scamguard::retry::ResilientInvoker;

/// Scam-awareness quiz backend.
#[derive(Debug, Parser)]
#[command(name = "scamguard", version, about)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the HTTP listen address
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.http_addr = listen;
    }
    if args.log_json {
        config.logging.json = true;
    }

    init_tracing(&config.logging);

    info!("Starting Scamguard");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        http_addr = %config.server.http_addr,
        model = %config.provider.model,
        "Configuration loaded"
    );

    // Admission state and its sweeper
    let registry = Arc::new(RateLimitRegistry::new());
    let clock = Arc::new(SystemClock);
    let admission = AdmissionController::with_clock(registry.clone(), clock.clone());
    let sweep = SweepTask::start(registry, clock, config.rate_limiting.sweep_interval());
    info!(
        max_requests = config.rate_limiting.explanation.max_requests,
        window_ms = config.rate_limiting.explanation.window_ms,
        "Admission controller initialized"
    );

    if config.provider.api_key.is_none() {
        warn!("No provider API key configured; explanation requests will fail");
    }
    let provider = Arc::new(OpenAiClient::new(config.provider.clone())?);
    let gateway = GenerationGateway::new(provider, ResilientInvoker::new(config.retry.clone()));

    let catalog = match &config.quiz.catalog_path {
        Some(path) => QuizCatalog::from_file(path)?,
        None => {
            warn!("No quiz catalog configured; serving an empty catalog");
            QuizCatalog::new(Vec::new())
        }
    };
    info!(quizzes = catalog.len(), "Quiz catalog loaded");

    let state = AppState::new(
        admission,
        config.rate_limiting.explanation,
        gateway,
        Arc::new(catalog),
        Arc::new(MemoryLeaderboard::new()),
    );

    let server = HttpServer::new(config.server.http_addr, state);
    let result = server.serve_with_shutdown(shutdown_signal()).await;

    sweep.stop().await;
    result?;

    info!("Scamguard stopped");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
