//! Service configuration.
//!
//! Layered, lowest precedence first: built-in defaults, an optional TOML
//! file, `DRC_*` environment variables, then the legacy
//! `MU_SPARQL_ENDPOINT` / `MU_APPLICATION_GRAPH` variables.

use std::{path::Path, path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use drc_core::vocab::{DEFAULT_MANIFEST_BASE, DEFAULT_STACK_BASE, ResourceUris};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "DRC";
pub const LEGACY_SPARQL_ENDPOINT: &str = "MU_SPARQL_ENDPOINT";
pub const LEGACY_APPLICATION_GRAPH: &str = "MU_APPLICATION_GRAPH";

/// Runtime service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_sparql_endpoint")]
  pub sparql_endpoint:     String,
  #[serde(default = "default_application_graph")]
  pub application_graph:   String,
  #[serde(default = "default_timeout_secs")]
  pub sparql_timeout_secs: u64,
  /// When set, the embedded SQLite store at this path replaces the SPARQL
  /// endpoint.
  #[serde(default)]
  pub store_path:          Option<PathBuf>,
  #[serde(default = "default_work_root")]
  pub work_root:           PathBuf,
  #[serde(default = "default_git_program")]
  pub git_program:         PathBuf,
  /// Extra arguments placed before `clone`.
  #[serde(default)]
  pub git_args:            Vec<String>,
  #[serde(default = "default_timeout_secs")]
  pub fetch_timeout_secs:  u64,
  #[serde(default = "default_stack_base_uri")]
  pub stack_base_uri:      String,
  #[serde(default = "default_manifest_base_uri")]
  pub manifest_base_uri:   String,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 80 }
fn default_sparql_endpoint() -> String { "http://database:8890/sparql".to_owned() }
fn default_application_graph() -> String {
  drc_store_sqlite::DEFAULT_GRAPH.to_owned()
}
fn default_timeout_secs() -> u64 { 60 }
fn default_work_root() -> PathBuf { PathBuf::from("/data") }
fn default_git_program() -> PathBuf { PathBuf::from("git") }
fn default_stack_base_uri() -> String { DEFAULT_STACK_BASE.to_owned() }
fn default_manifest_base_uri() -> String { DEFAULT_MANIFEST_BASE.to_owned() }

impl ServiceConfig {
  /// Load from `path` (if it exists) and the process environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::load_from(path, Environment::with_prefix(ENV_PREFIX), |key| {
      std::env::var(key).ok()
    })
  }

  fn load_from(
    path: &Path,
    env: Environment,
    legacy: impl Fn(&str) -> Option<String>,
  ) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(
        env
          .try_parsing(true)
          .list_separator(" ")
          .with_list_parse_key("git_args"),
      )
      .set_override_option("sparql_endpoint", legacy(LEGACY_SPARQL_ENDPOINT))?
      .set_override_option("application_graph", legacy(LEGACY_APPLICATION_GRAPH))?
      .build()?
      .try_deserialize()
  }

  pub fn uris(&self) -> ResourceUris {
    ResourceUris {
      stack_base:    self.stack_base_uri.clone(),
      manifest_base: self.manifest_base_uri.clone(),
    }
  }

  pub fn sparql_timeout(&self) -> Duration {
    Duration::from_secs(self.sparql_timeout_secs)
  }

  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_secs(self.fetch_timeout_secs)
  }
}
