//! mdport-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Build the conversion pipeline around the configured pandoc binary.
//! 4. Build the Axum router and start the HTTP server with graceful shutdown.
//!
//! The process exits non-zero only when the listener cannot be bound;
//! request-level failures never terminate it.

mod config;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use mdport_core::{Pandoc, Pipeline};
use tracing::{info, warn};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Build the log-level filter, warning loudly if the configured value is
    // not a valid tracing filter expression.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: MDPORT_LOG='{}' is not a valid tracing filter ({}); \
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

    info!(version = env!("CARGO_PKG_VERSION"), "mdport-server starting");

    // ── 3. Conversion pipeline ─────────────────────────────────────────────────
    let tool = Pandoc::new(cfg.pandoc_binary.clone(), cfg.convert_timeout);
    let pipeline = Pipeline::new(cfg.pipeline(), Arc::new(tool));
    info!(
        pandoc = %cfg.pandoc_binary,
        timeout_secs = cfg.convert_timeout.as_secs(),
        work_dir = %cfg.work_dir.display(),
        default_reference = %cfg.default_reference.display(),
        "conversion pipeline ready"
    );
    if !cfg.default_reference.is_file() {
        warn!(
            path = %cfg.default_reference.display(),
            "default reference doc not present; docx requests will use pandoc's built-in styles"
        );
    }

    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        pipeline,
    });

    // ── 4. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address '{}'", cfg.bind_address))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");
    info!("POST /api/convert - convert markdown to pdf, docx, html, epub, latex, rst, odt");
    info!("GET  /api/default-reference - download the default docx reference template");
    info!("GET  /api/health - health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mdport-server stopped");
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
        use tokio::signal::unix::{SignalKind, signal};
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
        _ = ctrl_c   => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
