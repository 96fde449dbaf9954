//! IRIs used in the application graph and the resource URI scheme.

use serde::Deserialize;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const DOAP_STACK: &str = "http://usefulinc.com/ns/doap#Stack";
pub const DOAP_LOCATION: &str = "http://usefulinc.com/ns/doap#location";

pub const MU_UUID: &str = "http://mu.semte.ch/vocabularies/core/uuid";

pub const SWARMUI_BRANCH: &str =
  "http://swarmui.semte.ch/vocabularies/core/branch";
/// The Stack → manifest edge. At most one per stack.
pub const SWARMUI_DOCKER_COMPOSE_FILE: &str =
  "http://swarmui.semte.ch/vocabularies/core/dockerComposeFile";

pub const STACKBUILDER_DOCKER_COMPOSE: &str =
  "http://stackbuilder.semte.ch/vocabularies/core/DockerCompose";
pub const STACKBUILDER_TEXT: &str =
  "http://stackbuilder.semte.ch/vocabularies/core/text";

pub const DCT_TITLE: &str = "http://purl.org/dc/terms/title";
pub const DCT_CREATED: &str = "http://purl.org/dc/terms/created";

pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

pub const DEFAULT_STACK_BASE: &str =
  "http://swarm-ui.big-data-europe.eu/resources/stacks/";
pub const DEFAULT_MANIFEST_BASE: &str =
  "http://stack-builder.big-data-europe.eu/resources/docker-composes/";

/// Base IRIs under which stack and manifest resources are minted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceUris {
  #[serde(default = "default_stack_base")]
  pub stack_base:    String,
  #[serde(default = "default_manifest_base")]
  pub manifest_base: String,
}

fn default_stack_base() -> String { DEFAULT_STACK_BASE.to_owned() }

fn default_manifest_base() -> String { DEFAULT_MANIFEST_BASE.to_owned() }

impl Default for ResourceUris {
  fn default() -> Self {
    Self {
      stack_base:    default_stack_base(),
      manifest_base: default_manifest_base(),
    }
  }
}

impl ResourceUris {
  pub fn stack_uri(&self, identifier: &str) -> String {
    join(&self.stack_base, identifier)
  }

  pub fn manifest_uri(&self, id: &str) -> String {
    join(&self.manifest_base, id)
  }
}

fn join(base: &str, id: &str) -> String {
  format!("{}/{id}", base.trim_end_matches('/'))
}
