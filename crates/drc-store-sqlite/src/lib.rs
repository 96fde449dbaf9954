//! Embedded SQLite triple store for the docker-compose handler.
//!
//! Stores the application graph as rows of a single `triples` table. Used for
//! local development and tests; production talks to a SPARQL endpoint through
//! `drc-store-sparql`. Wraps [`tokio_rusqlite`] so all database access runs
//! on a dedicated thread without blocking the async runtime.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_GRAPH, SqliteStore};
