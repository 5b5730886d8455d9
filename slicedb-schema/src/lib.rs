//! Typed view of the declarative schema configuration: tables, foreign-key
//! references, and sequences, cross-linked into a single immutable [`Schema`].

mod config;
mod model;

pub use config::{ReferenceConfig, SchemaConfig, SequenceConfig, TableConfig};
pub use model::{
    quote_ident, Direction, Directions, Reference, ReferenceId, Root, Schema, Sequence,
    SequenceId, Table, TableId, TableSegment,
};
