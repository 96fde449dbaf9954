//! [`SqliteStore`]: the SQLite implementation of [`StackGraph`].

use std::path::Path;

use drc_core::{
  graph::StackGraph,
  manifest::Manifest,
  stack::StackRecord,
  vocab::{
    DCT_CREATED, DCT_TITLE, DOAP_LOCATION, DOAP_STACK, MU_UUID, RDF_TYPE,
    STACKBUILDER_DOCKER_COMPOSE, STACKBUILDER_TEXT, SWARMUI_BRANCH,
    SWARMUI_DOCKER_COMPOSE_FILE, XSD_DATE_TIME,
  },
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  schema::{KIND_LITERAL, KIND_URI, SCHEMA},
};

/// Graph used when none is configured, matching mu.semte.ch defaults.
pub const DEFAULT_GRAPH: &str = "http://mu.semte.ch/application";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A triple store backed by a single SQLite file, scoped to one graph.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  graph: String,
}

/// Insert one triple; duplicates are ignored.
fn put(
  conn: &rusqlite::Connection,
  graph: &str,
  s: &str,
  p: &str,
  o: &str,
  kind: &str,
  datatype: Option<&str>,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT OR IGNORE INTO triples (graph, subject, predicate, object, object_kind, datatype)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![graph, s, p, o, kind, datatype],
  )?;
  Ok(())
}

/// Stack columns selected as `(uri, identifier, location, branch)`.
const STACK_SELECT: &str = "
  SELECT u.subject, u.object, l.object, b.object
  FROM triples u
  JOIN triples l ON l.graph = u.graph AND l.subject = u.subject AND l.predicate = ?3
  JOIN triples b ON b.graph = u.graph AND b.subject = u.subject AND b.predicate = ?4
  WHERE u.graph = ?1 AND u.predicate = ?2 AND u.object_kind = 'literal'";

impl SqliteStore {
  /// Open (or create) a store at `path` scoped to `graph`.
  pub async fn open(path: impl AsRef<Path>, graph: impl Into<String>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, graph: graph.into() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store on [`DEFAULT_GRAPH`], useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, graph: DEFAULT_GRAPH.to_owned() };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The same database scoped to a different graph.
  pub fn with_graph(mut self, graph: impl Into<String>) -> Self {
    self.graph = graph.into();
    self
  }

  pub fn graph(&self) -> &str { &self.graph }

  /// Record a stack node with its identifier and git coordinates.
  pub async fn add_stack(&self, record: &StackRecord) -> Result<()> {
    let graph = self.graph.clone();
    let record = record.clone();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let s = record.uri.as_str();
        put(&tx, &graph, s, RDF_TYPE, DOAP_STACK, KIND_URI, None)?;
        put(&tx, &graph, s, MU_UUID, &record.identifier, KIND_LITERAL, None)?;
        put(&tx, &graph, s, DOAP_LOCATION, &record.location, KIND_URI, None)?;
        put(&tx, &graph, s, SWARMUI_BRANCH, &record.branch, KIND_LITERAL, None)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Manifest IRIs the stack currently points at.
  pub async fn manifest_links(&self, stack_uri: &str) -> Result<Vec<String>> {
    let graph = self.graph.clone();
    let stack_uri = stack_uri.to_owned();
    let links = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT object FROM triples
           WHERE graph = ?1 AND subject = ?2 AND predicate = ?3
           ORDER BY object",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![graph, stack_uri, SWARMUI_DOCKER_COMPOSE_FILE],
            |row| row.get(0),
          )?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(links)
  }

  /// The stored compose text of a manifest.
  pub async fn manifest_text(&self, manifest_uri: &str) -> Result<Option<String>> {
    let graph = self.graph.clone();
    let uri = manifest_uri.to_owned();
    let text = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT object FROM triples
               WHERE graph = ?1 AND subject = ?2 AND predicate = ?3",
              rusqlite::params![graph, uri, STACKBUILDER_TEXT],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(text)
  }

  /// Number of manifest nodes in the graph.
  pub async fn count_manifests(&self) -> Result<usize> {
    let graph = self.graph.clone();
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM triples
           WHERE graph = ?1 AND predicate = ?2 AND object = ?3",
          rusqlite::params![graph, RDF_TYPE, STACKBUILDER_DOCKER_COMPOSE],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(n as usize)
  }

  async fn find_stack(&self, filter: &'static str, key: String) -> Result<Option<StackRecord>> {
    let graph = self.graph.clone();
    let sql = format!("{STACK_SELECT} AND {filter} LIMIT 1");
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![graph, MU_UUID, DOAP_LOCATION, SWARMUI_BRANCH, key],
              |row| {
                Ok(StackRecord {
                  uri:        row.get(0)?,
                  identifier: row.get(1)?,
                  location:   row.get(2)?,
                  branch:     row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(found)
  }
}

// ─── StackGraph impl ─────────────────────────────────────────────────────────

impl StackGraph for SqliteStore {
  type Error = Error;

  async fn has_manifest(&self, identifier: &str, stack_uri: &str) -> Result<bool> {
    let graph = self.graph.clone();
    let identifier = identifier.to_owned();
    let stack_uri = stack_uri.to_owned();
    let linked = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM triples e
             WHERE e.graph = ?1 AND e.predicate = ?2
               AND (e.subject = ?3 OR e.subject IN (
                 SELECT u.subject FROM triples u
                 WHERE u.graph = ?1 AND u.predicate = ?4 AND u.object = ?5
                   AND u.object_kind = 'literal')))",
          rusqlite::params![
            graph,
            SWARMUI_DOCKER_COMPOSE_FILE,
            stack_uri,
            MU_UUID,
            identifier,
          ],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(linked)
  }

  async fn find_stack_by_identifier(&self, identifier: &str) -> Result<Option<StackRecord>> {
    self.find_stack("u.object = ?5", identifier.to_owned()).await
  }

  async fn find_stack_by_uri(&self, uri: &str) -> Result<Option<StackRecord>> {
    self.find_stack("u.subject = ?5", uri.to_owned()).await
  }

  async fn insert_manifest(&self, manifest: &Manifest) -> Result<()> {
    let graph = self.graph.clone();
    let manifest = manifest.clone();
    let created = manifest.created_lexical();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let s = manifest.uri.as_str();
        put(&tx, &graph, s, RDF_TYPE, STACKBUILDER_DOCKER_COMPOSE, KIND_URI, None)?;
        put(&tx, &graph, s, MU_UUID, &manifest.id, KIND_LITERAL, None)?;
        put(&tx, &graph, s, STACKBUILDER_TEXT, &manifest.text, KIND_LITERAL, None)?;
        put(&tx, &graph, s, DCT_TITLE, &manifest.title, KIND_LITERAL, None)?;
        put(&tx, &graph, s, DCT_CREATED, &created, KIND_LITERAL, Some(XSD_DATE_TIME))?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn relink_manifest(&self, stack_uri: &str, manifest_uri: &str) -> Result<()> {
    let graph = self.graph.clone();
    let stack_uri = stack_uri.to_owned();
    let manifest_uri = manifest_uri.to_owned();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM triples WHERE graph = ?1 AND subject = ?2 AND predicate = ?3",
          rusqlite::params![graph, stack_uri, SWARMUI_DOCKER_COMPOSE_FILE],
        )?;
        put(
          &tx,
          &graph,
          &stack_uri,
          SWARMUI_DOCKER_COMPOSE_FILE,
          &manifest_uri,
          KIND_URI,
          None,
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
