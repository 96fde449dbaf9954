//! [`SparqlStore`]: a [`StackGraph`] over a SPARQL 1.1 endpoint.

use std::time::Duration;

use drc_core::{graph::StackGraph, manifest::Manifest, stack::StackRecord};
use reqwest::{Client, header::ACCEPT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
  Error, Result, query,
  query::{VAR_BRANCH, VAR_LOCATION, VAR_STACK, VAR_UUID},
  results::{AskResults, SelectResults},
  syntax::Iri,
};

/// Read timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const RESULTS_JSON: &str = "application/sparql-results+json";

/// Client for one endpoint, scoped to one application graph.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct SparqlStore {
  client:   Client,
  endpoint: String,
  graph:    String,
}

impl SparqlStore {
  pub fn new(
    endpoint: impl Into<String>,
    graph: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self> {
    let graph = graph.into();
    Iri::new(&graph)?;
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      endpoint: endpoint.into(),
      graph,
    })
  }

  pub fn endpoint(&self) -> &str { &self.endpoint }

  pub fn graph(&self) -> &str { &self.graph }

  fn graph_iri(&self) -> Result<Iri<'_>> { Iri::new(&self.graph) }

  async fn post(&self, field: &'static str, text: String) -> Result<reqwest::Response> {
    debug!(endpoint = %self.endpoint, field, "{text}");
    let resp = self
      .client
      .post(&self.endpoint)
      .header(ACCEPT, RESULTS_JSON)
      .form(&[(field, text)])
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status {
        status: status.as_u16(),
        body,
      });
    }
    Ok(resp)
  }

  async fn query<T: DeserializeOwned>(&self, text: String) -> Result<T> {
    Ok(self.post("query", text).await?.json().await?)
  }

  async fn update(&self, text: String) -> Result<()> {
    self.post("update", text).await?;
    Ok(())
  }
}

// ─── StackGraph impl ─────────────────────────────────────────────────────────

impl StackGraph for SparqlStore {
  type Error = Error;

  async fn has_manifest(&self, identifier: &str, stack_uri: &str) -> Result<bool> {
    let text =
      query::ask_has_manifest(self.graph_iri()?, identifier, Iri::new(stack_uri)?);
    let answer: AskResults = self.query(text).await?;
    Ok(answer.boolean)
  }

  async fn find_stack_by_identifier(&self, identifier: &str) -> Result<Option<StackRecord>> {
    let text = query::select_stack_by_identifier(self.graph_iri()?, identifier);
    let results: SelectResults = self.query(text).await?;
    Ok(results.first().and_then(|row| {
      Some(StackRecord {
        uri:        row.value(VAR_STACK)?.to_owned(),
        identifier: identifier.to_owned(),
        location:   row.value(VAR_LOCATION)?.to_owned(),
        branch:     row.value(VAR_BRANCH)?.to_owned(),
      })
    }))
  }

  async fn find_stack_by_uri(&self, uri: &str) -> Result<Option<StackRecord>> {
    let text = query::select_stack_by_uri(self.graph_iri()?, Iri::new(uri)?);
    let results: SelectResults = self.query(text).await?;
    Ok(results.first().and_then(|row| {
      Some(StackRecord {
        uri:        uri.to_owned(),
        identifier: row.value(VAR_UUID)?.to_owned(),
        location:   row.value(VAR_LOCATION)?.to_owned(),
        branch:     row.value(VAR_BRANCH)?.to_owned(),
      })
    }))
  }

  async fn insert_manifest(&self, manifest: &Manifest) -> Result<()> {
    let text = query::insert_manifest(self.graph_iri()?, manifest)?;
    self.update(text).await
  }

  async fn relink_manifest(&self, stack_uri: &str, manifest_uri: &str) -> Result<()> {
    let text = query::relink_manifest(
      self.graph_iri()?,
      Iri::new(stack_uri)?,
      Iri::new(manifest_uri)?,
    );
    self.update(text).await
  }
}
