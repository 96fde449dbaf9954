//! drc-handler server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `DRC_*` environment variables, picks a graph backend, and serves the
//! provisioning routes over HTTP.
//!
//! The SPARQL endpoint is used unless `store_path` is set, in which case an
//! embedded SQLite triple store at that path is opened instead.

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use drc_core::{graph::StackGraph, linker::GraphLinker};
use drc_git::GitFetcher;
use drc_handler::{AppState, ServiceConfig};
use drc_store_sparql::SparqlStore;
use drc_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Docker-compose provisioning service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServiceConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let fetcher = GitFetcher::new(cfg.git_program.clone(), cfg.work_root.clone())
    .with_global_args(&cfg.git_args);

  match &cfg.store_path {
    Some(path) => {
      let store = SqliteStore::open(path, cfg.application_graph.clone())
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      info!(path = %path.display(), graph = store.graph(), "using embedded SQLite store");
      serve(&cfg, store, fetcher).await
    }
    None => {
      let store = SparqlStore::new(
        cfg.sparql_endpoint.clone(),
        cfg.application_graph.clone(),
        cfg.sparql_timeout(),
      )
      .context("failed to build SPARQL client")?;
      info!(
        endpoint = store.endpoint(),
        graph = store.graph(),
        "using SPARQL endpoint"
      );
      serve(&cfg, store, fetcher).await
    }
  }
}

async fn serve<G>(cfg: &ServiceConfig, store: G, fetcher: GitFetcher) -> anyhow::Result<()>
where
  G: StackGraph + 'static,
{
  let linker = GraphLinker::new(Arc::new(store), Arc::new(fetcher), cfg.uris())
    .with_fetch_timeout(cfg.fetch_timeout());
  let app = drc_handler::router(AppState::new(linker));
  let address = format!("{}:{}", cfg.host, cfg.port);

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  info!("server stopped");
  Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      warn!("failed to listen for Ctrl+C: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(e) => {
        warn!("failed to listen for SIGTERM: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => info!("received SIGINT, shutting down"),
    _ = terminate => info!("received SIGTERM, shutting down"),
  }
}
