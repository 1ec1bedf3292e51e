//! # Transcript Audit Service
//!
//! HTTP service that scores speech-to-text output against a reference
//! transcript using Word Error Rate.
//!
//! ## Application Architecture:
//! - **config**: Layered configuration (defaults, `config.toml`, environment)
//! - **state**: Shared application state and request metrics
//! - **health**: Probes and monitoring endpoints
//! - **middleware**: Request logging and metrics collection
//! - **handlers**: Audit, keyword and configuration endpoints
//! - **wer**: Text normalization, word alignment and WER scoring
//! - **provider**: Remote transcription providers (Deepgram)
//! - **store**: Key-value storage for keyword and keyterm lists
//! - **error**: Error types and their HTTP responses

mod config;
mod error;
mod handlers;
mod health;
mod middleware;
mod provider;
mod state;
mod store;
mod wer;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use config::AppConfig;
use provider::{DeepgramProvider, TranscriptionProvider};
use state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use store::InMemoryStore;
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Set once SIGTERM or SIGINT has been received.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

#[actix_web::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting transcript-audit v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {}:{}", config.server.host, config.server.port);

    let provider = build_provider(&config)?;
    let app_state = AppState::new(config.clone(), provider, Arc::new(InMemoryStore::new()));
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        // Middleware runs in reverse registration order on the way in
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::MetricsMiddleware)
            .wrap(middleware::RequestLogging)
            .configure(handlers::configure_routes)
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Logging is controlled by `RUST_LOG`, defaulting to
/// `transcript_audit=debug,actix_web=info`.
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transcript_audit=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}

/// Without an API key the service still starts; text audits, keyword lists
/// and monitoring work, and audio audits answer with a configuration error.
fn build_provider(config: &AppConfig) -> Result<Option<Arc<dyn TranscriptionProvider>>> {
    if !config.provider_configured() {
        warn!("No transcription provider API key configured; audio audits are disabled");
        return Ok(None);
    }

    let provider = DeepgramProvider::from_config(&config.provider)?;
    info!(
        provider = provider.name(),
        model = %config.provider.model,
        "Transcription provider ready"
    );
    Ok(Some(Arc::new(provider)))
}

fn setup_signal_handlers() {
    tokio::spawn(async {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to install signal handlers: {}", e);
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
