//! SQL schema for the triple store.
//!
//! Executed once at connection startup. Idempotent thanks to
//! `CREATE ... IF NOT EXISTS`.

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per triple. Objects carry their term kind so an IRI and a literal
-- with the same text stay distinct.
CREATE TABLE IF NOT EXISTS triples (
    graph       TEXT NOT NULL,
    subject     TEXT NOT NULL,
    predicate   TEXT NOT NULL,
    object      TEXT NOT NULL,
    object_kind TEXT NOT NULL,   -- 'uri' | 'literal'
    datatype    TEXT,            -- literal datatype IRI or NULL
    PRIMARY KEY (graph, subject, predicate, object, object_kind)
);

CREATE INDEX IF NOT EXISTS triples_po_idx ON triples(graph, predicate, object);

PRAGMA user_version = 1;
";

/// `object_kind` of an IRI object.
pub const KIND_URI: &str = "uri";
/// `object_kind` of a literal object.
pub const KIND_LITERAL: &str = "literal";
