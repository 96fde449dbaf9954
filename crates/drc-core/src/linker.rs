//! `GraphLinker`: the check, fetch, persist, relink workflow.
//!
//! Each invocation walks
//! `CheckingLink → Fetching → Persisting → Relinking → Done`, or stops early
//! at `AlreadyLinked` when the stack has a manifest edge. Nothing is written
//! to the graph unless the fetch succeeds.

use std::{fmt, sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  fetch::{DEFAULT_FETCH_TIMEOUT, FetchFailure, FetchRequest, RepositoryFetcher},
  graph::StackGraph,
  lock::StackLocks,
  manifest::Manifest,
  stack::StackRef,
  vocab::ResourceUris,
};

/// Steps of one `ensure_and_link` run, as reported in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
  CheckingLink,
  AlreadyLinked,
  Fetching,
  Persisting,
  Relinking,
  Done,
}

/// How an `ensure_and_link` run ended.
#[derive(Debug)]
pub enum Outcome {
  /// A new manifest was stored and the stack now points at it.
  Linked { manifest_uri: String },
  /// The stack already had a manifest; nothing was done.
  AlreadyLinked,
  /// The repository could not be fetched; nothing was written.
  FetchFailed(FetchFailure),
}

impl fmt::Display for Outcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Outcome::Linked { manifest_uri } => write!(f, "linked <{manifest_uri}>"),
      Outcome::AlreadyLinked => f.write_str("already linked"),
      Outcome::FetchFailed(e) => write!(f, "fetch failed: {e}"),
    }
  }
}

/// Drives the provisioning workflow against a graph and a fetcher.
///
/// Cloning is cheap; clones share the graph, the fetcher and the per-stack
/// lock registry.
pub struct GraphLinker<G, F> {
  graph:         Arc<G>,
  fetcher:       Arc<F>,
  uris:          ResourceUris,
  fetch_timeout: Duration,
  locks:         StackLocks,
}

impl<G, F> Clone for GraphLinker<G, F> {
  fn clone(&self) -> Self {
    Self {
      graph:         self.graph.clone(),
      fetcher:       self.fetcher.clone(),
      uris:          self.uris.clone(),
      fetch_timeout: self.fetch_timeout,
      locks:         self.locks.clone(),
    }
  }
}

impl<G, F> GraphLinker<G, F>
where
  G: StackGraph,
  F: RepositoryFetcher,
{
  pub fn new(graph: Arc<G>, fetcher: Arc<F>, uris: ResourceUris) -> Self {
    Self {
      graph,
      fetcher,
      uris,
      fetch_timeout: DEFAULT_FETCH_TIMEOUT,
      locks: StackLocks::new(),
    }
  }

  pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
    self.fetch_timeout = timeout;
    self
  }

  pub fn graph(&self) -> &G { &self.graph }

  pub fn uris(&self) -> &ResourceUris { &self.uris }

  /// Make sure `stack` has a manifest, provisioning one if it has none.
  ///
  /// Runs for the same stack identifier are serialized, so of two concurrent
  /// triggers one links and the other observes `AlreadyLinked`.
  pub async fn ensure_and_link(&self, stack: &StackRef) -> Result<Outcome> {
    let graph = &*self.graph;
    let identifier = stack.identifier(graph).await?;
    let stack_uri = stack.uri(graph).await?;
    let _guard = self.locks.acquire(identifier).await;

    debug!(stack = identifier, state = ?LinkState::CheckingLink);
    if graph
      .has_manifest(identifier, stack_uri)
      .await
      .map_err(Error::store)?
    {
      info!(stack = identifier, state = ?LinkState::AlreadyLinked, "stack already has a manifest");
      return Ok(Outcome::AlreadyLinked);
    }

    let record = stack.record(graph).await?;
    debug!(
      stack = identifier,
      state = ?LinkState::Fetching,
      location = %record.location,
      branch = %record.branch,
    );
    let request = FetchRequest {
      identifier,
      location: &record.location,
      branch: &record.branch,
      timeout: self.fetch_timeout,
    };
    let text = match self.fetcher.fetch(request).await {
      Ok(text) => text,
      Err(failure) => {
        warn!(stack = identifier, error = %failure, "manifest fetch failed");
        return Ok(Outcome::FetchFailed(failure));
      }
    };

    let manifest = Manifest::new(&self.uris, identifier, text);
    debug!(stack = identifier, state = ?LinkState::Persisting, manifest = %manifest.uri);
    graph.insert_manifest(&manifest).await.map_err(Error::store)?;

    debug!(stack = identifier, state = ?LinkState::Relinking, stack_uri = %record.uri);
    graph
      .relink_manifest(&record.uri, &manifest.uri)
      .await
      .map_err(Error::store)?;

    info!(stack = identifier, state = ?LinkState::Done, manifest = %manifest.uri, "manifest linked");
    Ok(Outcome::Linked { manifest_uri: manifest.uri })
  }
}
