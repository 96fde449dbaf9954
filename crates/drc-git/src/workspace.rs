//! On-disk workspace naming.

use std::path::{Path, PathBuf};

use drc_core::{fetch::FetchFailure, stack::is_plain_identifier};

/// `<root>/<identifier>`, provided the identifier is a single plain path
/// segment (see [`is_plain_identifier`]).
pub fn workspace_dir(root: &Path, identifier: &str) -> Result<PathBuf, FetchFailure> {
  if !is_plain_identifier(identifier) {
    return Err(FetchFailure::InvalidWorkspace(identifier.to_owned()));
  }
  Ok(root.join(identifier))
}
