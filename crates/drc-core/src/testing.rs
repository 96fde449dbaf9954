//! In-memory doubles for unit tests.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use crate::{
  fetch::{FetchFailure, FetchRequest, RepositoryFetcher},
  graph::StackGraph,
  manifest::Manifest,
  stack::StackRecord,
};

#[derive(Default)]
struct GraphState {
  stacks:    Vec<StackRecord>,
  /// identifier → stack IRI for stacks that only exist as edge owners.
  ids:       HashMap<String, String>,
  manifests: HashMap<String, Manifest>,
  /// stack IRI → manifest IRIs.
  edges:     HashMap<String, Vec<String>>,
}

/// A graph that counts stack lookups.
#[derive(Default)]
pub struct MemoryGraph {
  state:        Mutex<GraphState>,
  lookups:      AtomicUsize,
  lookup_delay: Option<Duration>,
}

impl MemoryGraph {
  pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
    self.lookup_delay = Some(delay);
    self
  }

  pub fn add_stack(&self, record: StackRecord) {
    self.state.lock().unwrap().stacks.push(record);
  }

  pub fn link_existing(&self, identifier: &str, stack_uri: &str, manifest_uri: &str) {
    let mut state = self.state.lock().unwrap();
    state.ids.insert(identifier.to_owned(), stack_uri.to_owned());
    state
      .edges
      .entry(stack_uri.to_owned())
      .or_default()
      .push(manifest_uri.to_owned());
  }

  pub fn lookups(&self) -> usize { self.lookups.load(Ordering::SeqCst) }

  pub fn manifest_count(&self) -> usize {
    self.state.lock().unwrap().manifests.len()
  }

  pub fn manifest(&self, uri: &str) -> Option<Manifest> {
    self.state.lock().unwrap().manifests.get(uri).cloned()
  }

  pub fn edges_from(&self, stack_uri: &str) -> Vec<String> {
    self
      .state
      .lock()
      .unwrap()
      .edges
      .get(stack_uri)
      .cloned()
      .unwrap_or_default()
  }

  async fn lookup(&self, pred: impl Fn(&StackRecord) -> bool) -> Option<StackRecord> {
    self.lookups.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.lookup_delay {
      tokio::time::sleep(delay).await;
    }
    self.state.lock().unwrap().stacks.iter().find(|r| pred(r)).cloned()
  }
}

impl StackGraph for MemoryGraph {
  type Error = Infallible;

  async fn has_manifest(
    &self,
    identifier: &str,
    stack_uri: &str,
  ) -> Result<bool, Infallible> {
    let state = self.state.lock().unwrap();
    let mut uris: Vec<String> = state
      .stacks
      .iter()
      .filter(|r| r.identifier == identifier)
      .map(|r| r.uri.clone())
      .collect();
    uris.extend(state.ids.get(identifier).cloned());
    uris.push(stack_uri.to_owned());
    Ok(
      uris
        .iter()
        .any(|u| state.edges.get(u).is_some_and(|e| !e.is_empty())),
    )
  }

  async fn find_stack_by_identifier(
    &self,
    identifier: &str,
  ) -> Result<Option<StackRecord>, Infallible> {
    Ok(self.lookup(|r| r.identifier == identifier).await)
  }

  async fn find_stack_by_uri(
    &self,
    uri: &str,
  ) -> Result<Option<StackRecord>, Infallible> {
    Ok(self.lookup(|r| r.uri == uri).await)
  }

  async fn insert_manifest(&self, manifest: &Manifest) -> Result<(), Infallible> {
    self
      .state
      .lock()
      .unwrap()
      .manifests
      .insert(manifest.uri.clone(), manifest.clone());
    Ok(())
  }

  async fn relink_manifest(
    &self,
    stack_uri: &str,
    manifest_uri: &str,
  ) -> Result<(), Infallible> {
    self
      .state
      .lock()
      .unwrap()
      .edges
      .insert(stack_uri.to_owned(), vec![manifest_uri.to_owned()]);
    Ok(())
  }
}

/// A fetcher that returns canned text or a canned failure.
pub struct StaticFetcher {
  text:     String,
  failure:  Option<fn() -> FetchFailure>,
  delay:    Option<Duration>,
  requests: Mutex<Vec<(String, String, String)>>,
}

impl StaticFetcher {
  pub fn ok(text: &str) -> Self {
    Self {
      text:     text.to_owned(),
      failure:  None,
      delay:    None,
      requests: Mutex::new(Vec::new()),
    }
  }

  pub fn failing(failure: fn() -> FetchFailure) -> Self {
    Self {
      failure: Some(failure),
      ..Self::ok("")
    }
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn calls(&self) -> usize { self.requests.lock().unwrap().len() }

  pub fn requests(&self) -> Vec<(String, String, String)> {
    self.requests.lock().unwrap().clone()
  }
}

impl RepositoryFetcher for StaticFetcher {
  async fn fetch(&self, request: FetchRequest<'_>) -> Result<String, FetchFailure> {
    self.requests.lock().unwrap().push((
      request.identifier.to_owned(),
      request.location.to_owned(),
      request.branch.to_owned(),
    ));
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    match self.failure {
      Some(make) => Err(make()),
      None => Ok(self.text.clone()),
    }
  }
}
