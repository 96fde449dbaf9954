//! SPARQL 1.1 endpoint backend for the docker-compose handler.
//!
//! [`SparqlStore`] implements [`drc_core::graph::StackGraph`] by POSTing
//! queries and updates to a single endpoint, scoped to one application graph.
//! Query text is assembled in [`query`] from values rendered through
//! [`syntax`], so no caller-supplied string reaches the endpoint unescaped.

pub mod error;
pub mod query;
pub mod results;
pub mod syntax;

mod store;

pub use error::{Error, Result};
pub use store::{DEFAULT_TIMEOUT, SparqlStore};
