use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ll_domain::config::Config;
use ll_dispatch::DispatchClient;
use ll_engine::Engine;
use ll_gateway::cli::{Cli, Command};
use ll_gateway::state::AppState;
use ll_gateway::{api, monitor, worker};
use ll_llm::LlmClient;
use ll_stores::{AnalyticalStore, OperationalStore};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = match Config::from_env().context("loading configuration") {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = ?e, "startup failed");
            return std::process::ExitCode::from(1);
        }
    };

    let shutdown = CancellationToken::new();
    spawn_shutdown_listener(shutdown.clone());

    // Every error that can still reach this point comes from startup: the
    // polling loops themselves never return one, since §9's crash-avoidance
    // policy has them log a failed unit of work and continue rather than
    // propagate it. Exit code 2 (unrecoverable invariant violation) is
    // reserved for a future caller that surfaces one explicitly; none of
    // the current roles do.
    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_serve(config, shutdown).await,
        Command::Monitor => run_monitor_only(config, shutdown).await,
        Command::Worker => run_worker_only(config, shutdown).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "startup failed");
            std::process::ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ll_gateway=debug")))
        .json()
        .init();
}

/// Cancels `token` on Ctrl-C or SIGTERM, whichever arrives first.
fn spawn_shutdown_listener(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            let _ = tokio::signal::ctrl_c().await;
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
            _ = terminate => tracing::info!("received SIGTERM, shutting down"),
        }

        token.cancel();
    });
}

async fn build_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    tracing::info!("lingoloop starting");

    // ── Store adapters ───────────────────────────────────────────────
    let operational = Arc::new(
        OperationalStore::connect(&config.store_operational_dsn)
            .await
            .context("connecting to operational store")?,
    );
    tracing::info!("operational store ready");

    let analytical = Arc::new(
        AnalyticalStore::connect(&config.store_analytical_url, config.store_analytical_key.as_deref())
            .await
            .context("connecting to analytical store")?,
    );
    tracing::info!("analytical store ready");

    // ── Dispatch client ──────────────────────────────────────────────
    let dispatch = Arc::new(DispatchClient::new(config.webhook_url.clone(), config.webhook_timeout()));
    tracing::info!(webhook_url = %config.webhook_url, "dispatch client ready");

    // ── Exercise engine ──────────────────────────────────────────────
    let llm = ll_llm::client_from_config(&config);
    tracing::info!(provider_id = %llm.provider_id(), capability = ?llm.capability(), "llm client ready");
    let engine = Arc::new(Engine::new(llm));

    Ok(AppState::new(config, operational, analytical, dispatch, engine))
}

async fn run_serve(config: Arc<Config>, shutdown: CancellationToken) -> anyhow::Result<()> {
    let state = build_state(config.clone()).await?;

    // ── Background tasks ─────────────────────────────────────────────
    let monitor_handle = {
        let state = state.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { monitor::run(state, shutdown).await })
    };
    tracing::info!("class monitor started");

    let worker_handle = {
        let state = state.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { worker::run(state, shutdown).await })
    };
    tracing::info!("transcript worker started");

    serve_http(state, shutdown).await?;

    // The HTTP server only returns after its own graceful shutdown
    // completes; by then the token is already cancelled, so these just
    // wait out whatever grace period the loops are still using.
    let _ = tokio::join!(monitor_handle, worker_handle);

    Ok(())
}

async fn run_monitor_only(config: Arc<Config>, shutdown: CancellationToken) -> anyhow::Result<()> {
    let state = build_state(config).await?;
    monitor::run(state, shutdown).await;
    Ok(())
}

async fn run_worker_only(config: Arc<Config>, shutdown: CancellationToken) -> anyhow::Result<()> {
    let state = build_state(config).await?;
    worker::run(state, shutdown).await;
    Ok(())
}

async fn serve_http(state: AppState, shutdown: CancellationToken) -> anyhow::Result<()> {
    let addr = state.config.http_bind_addr.clone();

    let app = api::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(addr = %addr, "lingoloop listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("axum server error")?;

    tracing::info!("lingoloop stopped");

    Ok(())
}
