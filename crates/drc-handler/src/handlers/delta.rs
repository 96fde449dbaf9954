//! `POST /update`: react to change notifications from the delta service.
//!
//! Only the first `?s rdf:type doap:Stack` insert of a batch is acted on.
//! Every outcome is acknowledged with `200` so the notifier does not retry.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use drc_core::{
  delta::{DeltaNotification, extract_inserted_stack},
  fetch::RepositoryFetcher,
  graph::StackGraph,
  stack::StackRef,
};
use tracing::{debug, info};

use crate::{AppState, envelope::NO_STACK_INSERTED, error::Error};

pub async fn handler<G, F>(
  State(state): State<AppState<G, F>>,
  body: Bytes,
) -> Response
where
  G: StackGraph + 'static,
  F: RepositoryFetcher + 'static,
{
  let notification: DeltaNotification = match serde_json::from_slice(&body) {
    Ok(n) => n,
    Err(e) => return Error::InvalidJson(e).into_response(),
  };

  let Some(stack_uri) = extract_inserted_stack(notification.inserts()) else {
    debug!("notification inserts no stack");
    return (StatusCode::OK, NO_STACK_INSERTED).into_response();
  };

  let stack = StackRef::unresolved(stack_uri);
  let result = match state.linker.ensure_and_link(&stack).await {
    Ok(outcome) => {
      info!(stack = %stack.key(), %outcome, "delta handled");
      super::outcome_response(&stack, outcome)
    }
    Err(e) => Err(Error::from(e)),
  };
  match result {
    Ok(Json(envelope)) => (StatusCode::OK, Json(envelope)).into_response(),
    Err(e) => e.acknowledged(),
  }
}
