//! The `RepositoryFetcher` trait and its failure type.

use std::{future::Future, path::PathBuf, time::Duration};

use thiserror::Error;

/// Default bound on a single repository fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Why a fetch produced no manifest.
#[derive(Debug, Error)]
pub enum FetchFailure {
  /// The external command outlived its timeout and was asked to terminate.
  #[error("fetch timed out after {0:?}")]
  Timeout(Duration),

  /// The command succeeded but the workspace holds no manifest.
  #[error("{} not found in fetched repository", .0.display())]
  ManifestNotFound(PathBuf),

  #[error("fetch command exited with {status}: {stderr}")]
  CommandFailed { status: String, stderr: String },

  /// The stack identifier cannot be used as a workspace directory name.
  #[error("invalid workspace name {0:?}")]
  InvalidWorkspace(String),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

/// Coordinates of one fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
  /// Names the on-disk workspace.
  pub identifier: &'a str,
  pub location:   &'a str,
  pub branch:     &'a str,
  pub timeout:    Duration,
}

/// Retrieves a repository at a branch and returns its manifest text.
pub trait RepositoryFetcher: Send + Sync {
  fn fetch<'a>(
    &'a self,
    request: FetchRequest<'a>,
  ) -> impl Future<Output = Result<String, FetchFailure>> + Send + 'a;
}
