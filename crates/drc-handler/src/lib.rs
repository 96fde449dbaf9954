//! HTTP layer for the docker-compose handler.
//!
//! Exposes an axum [`Router`] with two triggers for the provisioning workflow
//! and a liveness probe:
//!
//! - `POST /createdrc`: direct request naming a stack by identifier.
//! - `POST /update`: change notification from the delta service.
//! - `GET /health`: answers `ok`.
//!
//! Both triggers drive one shared [`GraphLinker`], generic over the graph
//! backend and the repository fetcher.

pub mod envelope;
pub mod error;
pub mod handlers;
pub mod settings;

pub use error::Error;
pub use settings::ServiceConfig;

use axum::{
  Router,
  routing::{get, post},
};
use drc_core::{fetch::RepositoryFetcher, graph::StackGraph, linker::GraphLinker};
use tower_http::trace::TraceLayer;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<G, F> {
  pub linker: GraphLinker<G, F>,
}

impl<G, F> Clone for AppState<G, F> {
  fn clone(&self) -> Self {
    Self {
      linker: self.linker.clone(),
    }
  }
}

impl<G, F> AppState<G, F> {
  pub fn new(linker: GraphLinker<G, F>) -> Self { Self { linker } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the service [`Router`].
pub fn router<G, F>(state: AppState<G, F>) -> Router
where
  G: StackGraph + 'static,
  F: RepositoryFetcher + 'static,
{
  Router::new()
    .route("/createdrc", post(handlers::create::handler::<G, F>))
    .route("/update",    post(handlers::delta::handler::<G, F>))
    .route("/health",    get(health))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> &'static str { "ok" }
