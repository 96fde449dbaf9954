//! Core types and trait definitions for the docker-compose handler.
//!
//! This crate knows nothing about HTTP, SPARQL wire formats, SQLite or git.
//! Storage backends implement [`graph::StackGraph`], fetchers implement
//! [`fetch::RepositoryFetcher`], and the HTTP layer drives
//! [`linker::GraphLinker`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod delta;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod linker;
pub mod lock;
pub mod manifest;
pub mod stack;
pub mod vocab;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
