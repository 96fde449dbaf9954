//! Change notifications from the delta service and the Stack insert filter.
//!
//! A notification is a list of change sets, each holding the triples inserted
//! into and deleted from the graph, encoded as SPARQL JSON result terms:
//!
//! ```json
//! { "delta": [ { "inserts": [ { "s": {"type":"uri","value":"..."},
//!                               "p": {"type":"uri","value":"..."},
//!                               "o": {"type":"uri","value":"..."} } ],
//!                "deletes": [] } ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::vocab::{DOAP_STACK, RDF_TYPE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermKind {
  Uri,
  Literal,
  TypedLiteral,
  Bnode,
  #[serde(other)]
  Other,
}

/// One position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
  #[serde(rename = "type")]
  pub kind:     TermKind,
  pub value:    String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub datatype: Option<String>,
  #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
  pub lang:     Option<String>,
}

impl Term {
  pub fn uri(value: impl Into<String>) -> Self {
    Self {
      kind:     TermKind::Uri,
      value:    value.into(),
      datatype: None,
      lang:     None,
    }
  }

  pub fn literal(value: impl Into<String>) -> Self {
    Self {
      kind:     TermKind::Literal,
      value:    value.into(),
      datatype: None,
      lang:     None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
  pub s: Term,
  pub p: Term,
  pub o: Term,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
  #[serde(default)]
  pub inserts: Vec<Triple>,
  #[serde(default)]
  pub deletes: Vec<Triple>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaNotification {
  #[serde(default)]
  pub delta: Vec<ChangeSet>,
}

impl DeltaNotification {
  /// Inserted triples across all change sets, in notification order.
  pub fn inserts(&self) -> impl Iterator<Item = &Triple> {
    self.delta.iter().flat_map(|cs| cs.inserts.iter())
  }
}

/// Subject of the first `?s rdf:type doap:Stack` triple, if any.
///
/// Only the first Stack insert in a batch is acted on; later ones in the same
/// batch are ignored.
pub fn extract_inserted_stack<'a, I>(inserts: I) -> Option<&'a str>
where
  I: IntoIterator<Item = &'a Triple>,
{
  inserts
    .into_iter()
    .find(|t| t.p.value == RDF_TYPE && t.o.value == DOAP_STACK)
    .map(|t| t.s.value.as_str())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::vocab::MU_UUID;

  fn stack_insert(subject: &str) -> Triple {
    Triple {
      s: Term::uri(subject),
      p: Term::uri(RDF_TYPE),
      o: Term::uri(DOAP_STACK),
    }
  }

  fn unrelated(subject: &str) -> Triple {
    Triple {
      s: Term::uri(subject),
      p: Term::uri(MU_UUID),
      o: Term::literal("abc123"),
    }
  }

  #[test]
  fn finds_stack_among_unrelated_triples() {
    let inserts = vec![
      unrelated("http://example.test/a"),
      stack_insert("http://example.test/stacks/s"),
      unrelated("http://example.test/b"),
    ];
    assert_eq!(
      extract_inserted_stack(&inserts),
      Some("http://example.test/stacks/s")
    );
  }

  #[test]
  fn none_without_stack_insert() {
    let inserts = vec![unrelated("http://example.test/a")];
    assert_eq!(extract_inserted_stack(&inserts), None);
    assert_eq!(extract_inserted_stack(&Vec::<Triple>::new()), None);
  }

  #[test]
  fn first_stack_insert_wins() {
    let inserts = vec![
      stack_insert("http://example.test/stacks/s1"),
      stack_insert("http://example.test/stacks/s2"),
    ];
    assert_eq!(
      extract_inserted_stack(&inserts),
      Some("http://example.test/stacks/s1")
    );
  }

  #[test]
  fn type_triple_for_another_class_is_ignored() {
    let inserts = vec![Triple {
      s: Term::uri("http://example.test/x"),
      p: Term::uri(RDF_TYPE),
      o: Term::uri("http://stackbuilder.semte.ch/vocabularies/core/DockerCompose"),
    }];
    assert_eq!(extract_inserted_stack(&inserts), None);
  }

  #[test]
  fn parses_delta_service_payload() {
    let body = serde_json::json!({
      "delta": [
        { "inserts": [], "deletes": [] },
        {
          "inserts": [
            {
              "s": { "type": "uri", "value": "http://example.test/stacks/s" },
              "p": { "type": "uri", "value": RDF_TYPE },
              "o": { "type": "uri", "value": DOAP_STACK }
            },
            {
              "s": { "type": "uri", "value": "http://example.test/stacks/s" },
              "p": { "type": "uri", "value": MU_UUID },
              "o": { "type": "literal", "value": "abc123", "xml:lang": "en" }
            }
          ]
        }
      ]
    });

    let n: DeltaNotification = serde_json::from_value(body).unwrap();
    assert_eq!(n.inserts().count(), 2);
    assert_eq!(n.delta[1].inserts[1].o.lang.as_deref(), Some("en"));
    assert_eq!(
      extract_inserted_stack(n.inserts()),
      Some("http://example.test/stacks/s")
    );
  }

  #[test]
  fn unknown_term_kind_is_tolerated() {
    let t: Term =
      serde_json::from_str(r#"{"type":"triple","value":"x"}"#).unwrap();
    assert_eq!(t.kind, TermKind::Other);
  }
}
