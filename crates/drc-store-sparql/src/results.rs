//! `application/sparql-results+json` bodies.

use std::collections::HashMap;

use drc_core::delta::Term;
use serde::Deserialize;

/// Answer to an `ASK` query.
#[derive(Debug, Deserialize)]
pub struct AskResults {
  pub boolean: bool,
}

/// Answer to a `SELECT` query.
#[derive(Debug, Deserialize)]
pub struct SelectResults {
  pub results: Bindings,
}

#[derive(Debug, Default, Deserialize)]
pub struct Bindings {
  #[serde(default)]
  pub bindings: Vec<HashMap<String, Term>>,
}

impl SelectResults {
  /// The first solution, if any.
  pub fn first(&self) -> Option<Solution<'_>> {
    self.results.bindings.first().map(Solution)
  }
}

/// One row of a `SELECT` answer.
#[derive(Debug, Clone, Copy)]
pub struct Solution<'a>(&'a HashMap<String, Term>);

impl<'a> Solution<'a> {
  /// The lexical value bound to `var`. Unbound variables yield `None`.
  pub fn value(&self, var: &str) -> Option<&'a str> {
    self.0.get(var).map(|t| t.value.as_str())
  }
}
