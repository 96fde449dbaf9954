//! Error types for `drc-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No graph node matched the stack key.
  #[error("stack not found: {0}")]
  StackNotFound(String),

  #[error("graph store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from a [`StackGraph`](crate::graph::StackGraph).
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
