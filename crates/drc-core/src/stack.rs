//! `StackRef`: a reference to a Stack node whose coordinates may still need
//! to be looked up.
//!
//! A reference starts from one of two keys: the stack's identifier (direct
//! requests) or its node IRI (change notifications). Fields not supplied up
//! front are filled from a single graph lookup, shared by every accessor and
//! every concurrent caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::{Error, Result, graph::StackGraph, vocab::ResourceUris};

/// Everything the workflow needs to know about a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRecord {
  pub uri:        String,
  pub identifier: String,
  pub location:   String,
  pub branch:     String,
}

/// Whether `identifier` can name a stack: a single plain segment of ASCII
/// alphanumerics, `-`, `_` and `.`, other than `.` and `..`.
///
/// Identifiers become both the last segment of the stack IRI and the name of
/// its clone directory.
pub fn is_plain_identifier(identifier: &str) -> bool {
  !identifier.is_empty()
    && identifier != "."
    && identifier != ".."
    && identifier
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// What a [`StackRef`] was constructed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackKey {
  Identifier(String),
  Uri(String),
}

impl fmt::Display for StackKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StackKey::Identifier(id) => write!(f, "uuid {id:?}"),
      StackKey::Uri(uri) => write!(f, "<{uri}>"),
    }
  }
}

#[derive(Debug)]
pub struct StackRef {
  key:           StackKey,
  /// Caller-supplied values that win over looked-up ones.
  location_hint: Option<String>,
  branch_hint:   Option<String>,
  record:        OnceCell<StackRecord>,
}

impl StackRef {
  /// A stack named by identifier. When both `location` and `branch` are
  /// supplied the reference is complete and never touches the graph.
  pub fn resolved(
    uris: &ResourceUris,
    identifier: impl Into<String>,
    location: Option<String>,
    branch: Option<String>,
  ) -> Self {
    let identifier = identifier.into();
    match (location, branch) {
      (Some(location), Some(branch)) => {
        let record = StackRecord {
          uri: uris.stack_uri(&identifier),
          identifier: identifier.clone(),
          location,
          branch,
        };
        Self {
          key:           StackKey::Identifier(identifier),
          location_hint: None,
          branch_hint:   None,
          record:        OnceCell::new_with(Some(record)),
        }
      }
      (location_hint, branch_hint) => Self {
        key: StackKey::Identifier(identifier),
        location_hint,
        branch_hint,
        record: OnceCell::new(),
      },
    }
  }

  /// A stack known only by its node IRI.
  pub fn unresolved(uri: impl Into<String>) -> Self {
    Self {
      key:           StackKey::Uri(uri.into()),
      location_hint: None,
      branch_hint:   None,
      record:        OnceCell::new(),
    }
  }

  pub fn key(&self) -> &StackKey { &self.key }

  /// The record, if it is already known.
  pub fn cached(&self) -> Option<&StackRecord> { self.record.get() }

  /// Resolve every field, looking the stack up at most once.
  ///
  /// Concurrent callers wait on the same lookup. A failed lookup leaves the
  /// reference unresolved so a later call may retry.
  pub async fn record<G: StackGraph>(&self, graph: &G) -> Result<&StackRecord> {
    self
      .record
      .get_or_try_init(|| async {
        let found = match &self.key {
          StackKey::Identifier(id) => graph.find_stack_by_identifier(id).await,
          StackKey::Uri(uri) => graph.find_stack_by_uri(uri).await,
        }
        .map_err(Error::store)?;

        let mut record =
          found.ok_or_else(|| Error::StackNotFound(self.key.to_string()))?;
        if let Some(location) = &self.location_hint {
          record.location.clone_from(location);
        }
        if let Some(branch) = &self.branch_hint {
          record.branch.clone_from(branch);
        }
        Ok::<_, Error>(record)
      })
      .await
  }

  pub async fn identifier<G: StackGraph>(&self, graph: &G) -> Result<&str> {
    match &self.key {
      StackKey::Identifier(id) => Ok(id),
      StackKey::Uri(_) => Ok(&self.record(graph).await?.identifier),
    }
  }

  pub async fn uri<G: StackGraph>(&self, graph: &G) -> Result<&str> {
    match &self.key {
      StackKey::Uri(uri) => Ok(uri),
      StackKey::Identifier(_) => Ok(&self.record(graph).await?.uri),
    }
  }

  pub async fn repository_location<G: StackGraph>(
    &self,
    graph: &G,
  ) -> Result<&str> {
    Ok(&self.record(graph).await?.location)
  }

  pub async fn branch<G: StackGraph>(&self, graph: &G) -> Result<&str> {
    Ok(&self.record(graph).await?.branch)
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::testing::MemoryGraph;

  const URI: &str = "http://swarm-ui.big-data-europe.eu/resources/stacks/abc123";

  fn seeded() -> MemoryGraph {
    let graph = MemoryGraph::default();
    graph.add_stack(StackRecord {
      uri:        URI.into(),
      identifier: "abc123".into(),
      location:   "https://example.test/r.git".into(),
      branch:     "main".into(),
    });
    graph
  }

  #[tokio::test]
  async fn complete_resolved_ref_never_looks_up() {
    let graph = MemoryGraph::default();
    let stack = StackRef::resolved(
      &ResourceUris::default(),
      "abc123",
      Some("https://example.test/r.git".into()),
      Some("main".into()),
    );

    assert_eq!(stack.identifier(&graph).await.unwrap(), "abc123");
    assert_eq!(
      stack.repository_location(&graph).await.unwrap(),
      "https://example.test/r.git"
    );
    assert_eq!(stack.branch(&graph).await.unwrap(), "main");
    assert_eq!(stack.uri(&graph).await.unwrap(), URI);
    assert_eq!(graph.lookups(), 0);
  }

  #[tokio::test]
  async fn unresolved_ref_looks_up_once() {
    let graph = seeded();
    let stack = StackRef::unresolved(URI);
    assert!(stack.cached().is_none());

    assert_eq!(stack.branch(&graph).await.unwrap(), "main");
    assert_eq!(stack.identifier(&graph).await.unwrap(), "abc123");
    assert_eq!(
      stack.repository_location(&graph).await.unwrap(),
      "https://example.test/r.git"
    );
    assert_eq!(stack.uri(&graph).await.unwrap(), URI);
    assert_eq!(graph.lookups(), 1);
    assert!(stack.cached().is_some());
  }

  #[tokio::test]
  async fn concurrent_accessors_share_one_lookup() {
    let graph = seeded().with_lookup_delay(Duration::from_millis(20));
    let stack = StackRef::unresolved(URI);

    let (id, loc, branch) = tokio::join!(
      stack.identifier(&graph),
      stack.repository_location(&graph),
      stack.branch(&graph),
    );
    assert_eq!(id.unwrap(), "abc123");
    assert_eq!(loc.unwrap(), "https://example.test/r.git");
    assert_eq!(branch.unwrap(), "main");
    assert_eq!(graph.lookups(), 1);
  }

  #[tokio::test]
  async fn partial_resolved_ref_fills_missing_fields_by_identifier() {
    let graph = seeded();
    let stack = StackRef::resolved(
      &ResourceUris::default(),
      "abc123",
      None,
      Some("develop".into()),
    );

    assert_eq!(stack.identifier(&graph).await.unwrap(), "abc123");
    assert_eq!(graph.lookups(), 0);

    assert_eq!(
      stack.repository_location(&graph).await.unwrap(),
      "https://example.test/r.git"
    );
    assert_eq!(stack.branch(&graph).await.unwrap(), "develop");
    assert_eq!(graph.lookups(), 1);
  }

  #[tokio::test]
  async fn unknown_stack_is_not_found() {
    let graph = MemoryGraph::default();
    let stack = StackRef::unresolved("http://example.test/stacks/missing");

    let err = stack.branch(&graph).await.unwrap_err();
    assert!(matches!(err, Error::StackNotFound(_)), "got {err:?}");
    assert!(stack.cached().is_none());
  }

  #[test]
  fn plain_identifiers() {
    for ok in ["abc123", "5b3f-a_1.x", "..."] {
      assert!(is_plain_identifier(ok), "rejected {ok:?}");
    }
    for bad in ["", ".", "..", "../etc", "a/b", "a\\b", "a b", "a>b", "é"] {
      assert!(!is_plain_identifier(bad), "accepted {bad:?}");
    }
  }
}
