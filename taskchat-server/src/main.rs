//! taskchat-server – entry point.
//!
//! Startup order:
//! 1. Load `.env` and parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON or human-readable).
//! 3. Build the upstream model client and the shared application state.
//! 4. Build the Axum router and start the HTTP server with graceful shutdown.
//!
//! `list-models` and `probe-model` run against the configured API key and
//! exit without starting the server.

mod commands;
mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod schemas;
mod state;

#[cfg(test)]
mod test_helpers;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use taskchat_core::GeminiClient;
use tracing::{info, warn};

use crate::config::Config;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "taskchat-server", version, about = "To-do list service with a chat endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// List the models visible to GEMINI_API_KEY.
    ListModels,
    /// Send a short prompt to one or more models and print the replies.
    ProbeModel {
        /// Model to probe; repeat for several. Defaults to the configured model.
        #[arg(long = "model")]
        models: Vec<String>,
        /// Prompt to send.
        #[arg(long, default_value = "Say hello")]
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── 1. Configuration ───────────────────────────────────────────────────────
    let dotenv = config::load_dotenv();
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    init_tracing(&cfg);
    match dotenv {
        Ok(Some(path)) => info!(path = %path.display(), "loaded .env"),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "ignoring malformed .env file"),
    }

    // ── 3. Upstream model client ───────────────────────────────────────────────
    let model = GeminiClient::new(
        cfg.gemini_api_key.clone(),
        cfg.gemini_model.clone(),
        cfg.gemini_base_url.clone(),
    )?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg, model).await,
        Command::ListModels => commands::list_models(&model).await,
        Command::ProbeModel { models, prompt } => {
            commands::probe_models(&model, &models, &prompt, cfg.llm_timeout).await
        }
    }
}

/// Build the log-level filter, warning loudly if the configured value is
/// not a valid tracing filter expression.
fn init_tracing(cfg: &Config) {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: TASKCHAT_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn serve(cfg: Config, model: GeminiClient) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "taskchat-server starting");
    if cfg.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; /chat will fail until it is configured");
    }
    info!(model = %cfg.gemini_model, timeout_s = cfg.llm_timeout.as_secs(), "chat model configured");

    let addr: SocketAddr = cfg.bind_address.parse()?;
    let state = Arc::new(AppState::new(cfg, Arc::new(model)));
    let app = routes::build(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("taskchat-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c    => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
