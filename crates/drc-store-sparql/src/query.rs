//! Query and update text.
//!
//! Every builder takes already-validated [`Iri`]s; plain strings only ever
//! enter the text through [`Literal`].

use drc_core::{
  manifest::Manifest,
  vocab::{
    DCT_CREATED, DCT_TITLE, DOAP_LOCATION, MU_UUID, RDF_TYPE,
    STACKBUILDER_DOCKER_COMPOSE, STACKBUILDER_TEXT, SWARMUI_BRANCH,
    SWARMUI_DOCKER_COMPOSE_FILE, XSD_DATE_TIME,
  },
};

use crate::{
  Result,
  syntax::{Iri, Literal, TypedLiteral},
};

/// Variables bound by the stack SELECTs.
pub const VAR_STACK: &str = "stack";
pub const VAR_UUID: &str = "uuid";
pub const VAR_LOCATION: &str = "location";
pub const VAR_BRANCH: &str = "branch";

/// Whether the stack owns a manifest edge, matching it by `mu:uuid` or by
/// its node IRI.
pub fn ask_has_manifest(graph: Iri<'_>, identifier: &str, stack: Iri<'_>) -> String {
  format!(
    "ASK FROM {graph} WHERE {{
  {{
    ?stack <{MU_UUID}> {id} .
    ?stack <{SWARMUI_DOCKER_COMPOSE_FILE}> ?manifest .
  }} UNION {{
    {stack} <{SWARMUI_DOCKER_COMPOSE_FILE}> ?manifest .
  }}
}}",
    id = Literal(identifier),
  )
}

pub fn select_stack_by_identifier(graph: Iri<'_>, identifier: &str) -> String {
  format!(
    "SELECT ?{VAR_STACK} ?{VAR_LOCATION} ?{VAR_BRANCH} FROM {graph} WHERE {{
  ?{VAR_STACK} <{MU_UUID}> {id} ;
    <{DOAP_LOCATION}> ?{VAR_LOCATION} ;
    <{SWARMUI_BRANCH}> ?{VAR_BRANCH} .
}} LIMIT 1",
    id = Literal(identifier),
  )
}

pub fn select_stack_by_uri(graph: Iri<'_>, stack: Iri<'_>) -> String {
  format!(
    "SELECT ?{VAR_UUID} ?{VAR_LOCATION} ?{VAR_BRANCH} FROM {graph} WHERE {{
  {stack} <{MU_UUID}> ?{VAR_UUID} ;
    <{DOAP_LOCATION}> ?{VAR_LOCATION} ;
    <{SWARMUI_BRANCH}> ?{VAR_BRANCH} .
}} LIMIT 1"
  )
}

/// One `INSERT DATA` for the whole manifest node.
pub fn insert_manifest(graph: Iri<'_>, manifest: &Manifest) -> Result<String> {
  let node = Iri::new(&manifest.uri)?;
  let created = manifest.created_lexical();
  let created = TypedLiteral {
    value:    &created,
    datatype: Iri::new(XSD_DATE_TIME)?,
  };
  Ok(format!(
    "INSERT DATA {{
  GRAPH {graph} {{
    {node} <{RDF_TYPE}> <{STACKBUILDER_DOCKER_COMPOSE}> .
    {node} <{MU_UUID}> {id} .
    {node} <{STACKBUILDER_TEXT}> {text} .
    {node} <{DCT_TITLE}> {title} .
    {node} <{DCT_CREATED}> {created} .
  }}
}}",
    id = Literal(&manifest.id),
    text = Literal(&manifest.text),
    title = Literal(&manifest.title),
  ))
}

/// Drop any existing edge and insert the new one, in one update request.
pub fn relink_manifest(graph: Iri<'_>, stack: Iri<'_>, manifest: Iri<'_>) -> String {
  format!(
    "DELETE {{
  GRAPH {graph} {{ {stack} <{SWARMUI_DOCKER_COMPOSE_FILE}> ?old . }}
}}
WHERE {{
  GRAPH {graph} {{ OPTIONAL {{ {stack} <{SWARMUI_DOCKER_COMPOSE_FILE}> ?old . }} }}
}} ;
INSERT DATA {{
  GRAPH {graph} {{ {stack} <{SWARMUI_DOCKER_COMPOSE_FILE}> {manifest} . }}
}}"
  )
}
