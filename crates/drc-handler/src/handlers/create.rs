//! `POST /createdrc`: provision a manifest for a stack named by identifier.

use axum::{Json, extract::State};
use bytes::Bytes;
use drc_core::{
  fetch::RepositoryFetcher,
  graph::StackGraph,
  stack::{StackRef, is_plain_identifier},
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, envelope::SuccessEnvelope, error::Error};

/// Request body. Missing `location` or `branch` are looked up in the graph
/// by `uuid`.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
  pub uuid:     String,
  #[serde(default)]
  pub location: Option<String>,
  #[serde(default)]
  pub branch:   Option<String>,
}

pub async fn handler<G, F>(
  State(state): State<AppState<G, F>>,
  body: Bytes,
) -> Result<Json<SuccessEnvelope>, Error>
where
  G: StackGraph + 'static,
  F: RepositoryFetcher + 'static,
{
  let request: CreateRequest =
    serde_json::from_slice(&body).map_err(Error::InvalidJson)?;
  if !is_plain_identifier(&request.uuid) {
    return Err(Error::InvalidIdentifier(request.uuid));
  }

  let stack = StackRef::resolved(
    state.linker.uris(),
    request.uuid,
    request.location,
    request.branch,
  );
  let outcome = state.linker.ensure_and_link(&stack).await?;
  info!(stack = %stack.key(), %outcome, "createdrc handled");
  super::outcome_response(&stack, outcome)
}
