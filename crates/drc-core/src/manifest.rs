//! Manifest: a persisted docker-compose file.
//!
//! Manifests are immutable. Re-provisioning a stack mints a new manifest and
//! moves the stack's edge; the old manifest is left in the graph.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vocab::ResourceUris;

/// Path of the manifest inside a fetched repository.
pub const MANIFEST_FILE: &str = "docker-compose.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
  /// Hyphen-less UUID, also stored as `mu:uuid`.
  pub id:         String,
  pub uri:        String,
  /// `stack_{stack}_drc_{id}`.
  pub title:      String,
  pub text:       String,
  pub created_at: DateTime<Utc>,
}

impl Manifest {
  /// Mint a new manifest for `stack_identifier` holding `text`.
  pub fn new(uris: &ResourceUris, stack_identifier: &str, text: String) -> Self {
    let id = Uuid::new_v4().simple().to_string();
    Self {
      uri: uris.manifest_uri(&id),
      title: format!("stack_{stack_identifier}_drc_{id}"),
      id,
      text,
      created_at: Utc::now(),
    }
  }

  /// `created_at` as an `xsd:dateTime` lexical value, UTC, millisecond
  /// precision.
  pub fn created_lexical(&self) -> String {
    self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn uri_and_title_derive_from_id() {
    let uris = ResourceUris::default();
    let m = Manifest::new(&uris, "abc123", "services: {}\n".into());

    assert_eq!(m.id.len(), 32);
    assert!(!m.id.contains('-'));
    assert_eq!(m.uri, uris.manifest_uri(&m.id));
    assert_eq!(m.title, format!("stack_abc123_drc_{}", m.id));
    assert_eq!(m.text, "services: {}\n");
  }

  #[test]
  fn every_manifest_gets_a_fresh_id() {
    let uris = ResourceUris::default();
    let a = Manifest::new(&uris, "s", String::new());
    let b = Manifest::new(&uris, "s", String::new());
    assert_ne!(a.id, b.id);
    assert_ne!(a.uri, b.uri);
  }

  #[test]
  fn created_lexical_is_utc_millis() {
    let mut m = Manifest::new(&ResourceUris::default(), "s", String::new());
    m.created_at = DateTime::parse_from_rfc3339("2024-03-01T12:30:05.123456+02:00")
      .unwrap()
      .with_timezone(&Utc);
    assert_eq!(m.created_lexical(), "2024-03-01T10:30:05.123Z");
  }
}
