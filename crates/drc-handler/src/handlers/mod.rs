pub mod create;
pub mod delta;

use axum::Json;
use drc_core::{
  linker::Outcome,
  stack::{StackKey, StackRef},
};

use crate::{envelope::SuccessEnvelope, error::Error};

/// Map a finished workflow run onto the response body.
pub(crate) fn outcome_response(
  stack: &StackRef,
  outcome: Outcome,
) -> Result<Json<SuccessEnvelope>, Error> {
  match outcome {
    Outcome::Linked { .. } => Ok(Json(SuccessEnvelope::linked())),
    Outcome::AlreadyLinked => Err(Error::Conflict(stack_identifier(stack))),
    Outcome::FetchFailed(failure) => Err(Error::Fetch(failure)),
  }
}

/// The identifier to report for `stack`, falling back to its IRI when it
/// was never resolved.
fn stack_identifier(stack: &StackRef) -> String {
  match (stack.key(), stack.cached()) {
    (StackKey::Identifier(id), _) => id.clone(),
    (StackKey::Uri(_), Some(record)) => record.identifier.clone(),
    (StackKey::Uri(uri), None) => uri.clone(),
  }
}
