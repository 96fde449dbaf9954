//! The `StackGraph` trait.
//!
//! Implemented by storage backends (`drc-store-sparql`, `drc-store-sqlite`).
//! Every method targets the single application graph the backend was opened
//! against; callers never see query text.

use std::future::Future;

use crate::{manifest::Manifest, stack::StackRecord};

/// Abstraction over the graph holding stacks and their manifests.
///
/// All methods return `Send` futures so the trait can be used behind axum
/// handlers on a multi-threaded runtime.
pub trait StackGraph: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether the stack already has a manifest edge. The stack is matched by
  /// its `mu:uuid` or by its node IRI, whichever the graph knows.
  fn has_manifest<'a>(
    &'a self,
    identifier: &'a str,
    stack_uri: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Look a stack up by its `mu:uuid`. Returns `None` unless the node also
  /// carries a repository location and a branch.
  fn find_stack_by_identifier<'a>(
    &'a self,
    identifier: &'a str,
  ) -> impl Future<Output = Result<Option<StackRecord>, Self::Error>> + Send + 'a;

  /// Look a stack up by its node IRI. Same completeness rule as
  /// [`find_stack_by_identifier`](Self::find_stack_by_identifier).
  fn find_stack_by_uri<'a>(
    &'a self,
    uri: &'a str,
  ) -> impl Future<Output = Result<Option<StackRecord>, Self::Error>> + Send + 'a;

  /// Write a new manifest node in one insert.
  fn insert_manifest<'a>(
    &'a self,
    manifest: &'a Manifest,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Replace whatever manifest edge `stack_uri` has with one pointing at
  /// `manifest_uri`. Delete and insert are applied atomically.
  fn relink_manifest<'a>(
    &'a self,
    stack_uri: &'a str,
    manifest_uri: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
