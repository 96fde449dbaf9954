//! Rendering of SPARQL terms.
//!
//! [`Iri`] validates on construction and renders as `<…>`. [`Literal`]
//! renders a plain string as a `STRING_LITERAL2` (double-quoted) with every
//! character that would end or corrupt the literal escaped.

use std::fmt;

use crate::{Error, Result};

/// A validated IRI reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iri<'a>(&'a str);

impl<'a> Iri<'a> {
  /// Rejects empty values and anything the `IRIREF` production forbids:
  /// `<>"{}|^` backtick, backslash, whitespace and control characters.
  pub fn new(value: &'a str) -> Result<Self> {
    let forbidden = |c: char| {
      c <= ' ' || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
    };
    if value.is_empty() || value.chars().any(forbidden) {
      return Err(Error::InvalidIri(value.to_owned()));
    }
    Ok(Self(value))
  }

  pub fn as_str(&self) -> &'a str { self.0 }
}

impl fmt::Display for Iri<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<{}>", self.0)
  }
}

/// A plain string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal<'a>(pub &'a str);

impl fmt::Display for Literal<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use fmt::Write as _;

    f.write_char('"')?;
    for c in self.0.chars() {
      match c {
        '"' => f.write_str("\\\"")?,
        '\\' => f.write_str("\\\\")?,
        '\n' => f.write_str("\\n")?,
        '\r' => f.write_str("\\r")?,
        '\t' => f.write_str("\\t")?,
        '\u{8}' => f.write_str("\\b")?,
        '\u{c}' => f.write_str("\\f")?,
        c => f.write_char(c)?,
      }
    }
    f.write_char('"')
  }
}

/// A literal with a datatype, e.g. `"2024-01-01T00:00:00Z"^^<…#dateTime>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedLiteral<'a> {
  pub value:    &'a str,
  pub datatype: Iri<'a>,
}

impl fmt::Display for TypedLiteral<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}^^{}", Literal(self.value), self.datatype)
  }
}
