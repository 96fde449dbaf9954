//! Error type for `drc-store-sparql`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("SPARQL request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("SPARQL endpoint answered {status}: {body}")]
  Status { status: u16, body: String },

  #[error("invalid IRI: {0:?}")]
  InvalidIri(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
