//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use drc_core::fetch::FetchFailure;
use thiserror::Error;

use crate::envelope::ErrorEnvelope;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid json: {0}")]
  InvalidJson(#[source] serde_json::Error),

  /// The request names a stack by an identifier that cannot be one.
  #[error("invalid stack identifier {0:?}")]
  InvalidIdentifier(String),

  /// The stack already has a manifest. Carries the stack identifier.
  #[error("stack {0} already has a docker-compose")]
  Conflict(String),

  #[error("stack not found: {0}")]
  NotFound(String),

  #[error("fetch failed: {0}")]
  Fetch(#[from] FetchFailure),

  #[error("graph store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<drc_core::Error> for Error {
  fn from(e: drc_core::Error) -> Self {
    match e {
      drc_core::Error::StackNotFound(key) => Error::NotFound(key),
      drc_core::Error::Store(e) => Error::Store(e),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// Status used by the direct-request route.
  pub fn status(&self) -> StatusCode {
    match self {
      Error::InvalidJson(_) | Error::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Conflict(_) | Error::Fetch(_) | Error::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  pub fn envelope(&self) -> ErrorEnvelope {
    let (title, detail) = match self {
      Error::InvalidJson(e) => ("Invalid JSON", e.to_string()),
      Error::InvalidIdentifier(id) => (
        "Invalid stack identifier",
        format!("{id:?} is not a valid stack identifier"),
      ),
      Error::Conflict(id) => (
        "Stack already has DockerCompose",
        format!("Stack {id} already has DockerCompose linked to it"),
      ),
      Error::NotFound(key) => ("Stack not found", format!("No stack matches {key}")),
      Error::Fetch(e) => ("Failed to fetch docker-compose.yml", e.to_string()),
      Error::Store(e) => ("Graph store error", e.to_string()),
    };
    ErrorEnvelope {
      status: self.status().as_u16(),
      title:  title.to_owned(),
      detail,
    }
  }

  /// Response for the change-notification route: always `200`, the envelope
  /// carries the failure. Malformed bodies are still rejected with `400`.
  pub fn acknowledged(self) -> Response {
    match self {
      Error::InvalidJson(_) => self.into_response(),
      _ => (StatusCode::OK, Json(self.envelope())).into_response(),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::InvalidJson(_) => {
        (StatusCode::BAD_REQUEST, "invalid json").into_response()
      }
      _ => (self.status(), Json(self.envelope())).into_response(),
    }
  }
}
