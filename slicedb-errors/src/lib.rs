//! Shared error type for the slice-db engine.
//!
//! Every crate in the workspace reports failures through [`SliceError`] so that
//! the CLI can print a single line naming the error kind and the originating
//! object id, per the core's error handling policy: the first error aborts the
//! operation, and nothing is retried.

use std::fmt;

/// The kind of object an error originated from (a table, a reference, a
/// segment, ...). Carried alongside the error so the top-level reporter can
/// name it without re-deriving context from the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectId {
    Table(String),
    Reference(String),
    Segment(String, u32),
    Sequence(String),
    Transform(String),
    Constraint(String),
    None,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectId::Table(id) => write!(f, "table {id}"),
            ObjectId::Reference(id) => write!(f, "reference {id}"),
            ObjectId::Segment(table, index) => write!(f, "segment {table}/{index}"),
            ObjectId::Sequence(id) => write!(f, "sequence {id}"),
            ObjectId::Transform(name) => write!(f, "transform {name}"),
            ObjectId::Constraint(name) => write!(f, "constraint {name}"),
            ObjectId::None => write!(f, "<none>"),
        }
    }
}

/// The five error kinds from the core's error handling design.
#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    /// Missing/unknown table or reference, a cycle in the non-deferrable
    /// restore DAG, deferral requested outside a transaction, an unknown
    /// transform class or name. Fatal pre-flight.
    #[error("configuration error ({object}): {message}")]
    Configuration { object: ObjectId, message: String },

    /// Archive read/write, temp file, or process spawn failure.
    #[error("i/o error ({object}): {source}")]
    Io {
        object: ObjectId,
        #[source]
        source: std::io::Error,
    },

    /// Query error, snapshot setup failure, connection loss.
    #[error("database error ({object}): {message}")]
    Database { object: ObjectId, message: String },

    /// Malformed bulk-copy escape, a JSONPath match of a non-string
    /// non-null value, or a transform precondition violation. Fatal for the
    /// containing segment, propagated up as a data error.
    #[error("data error ({object}): {message}")]
    Data { object: ObjectId, message: String },

    /// A sibling task failed; this is the silent-bubble case — the
    /// original failure is what gets reported.
    #[error("cancelled because a sibling task failed")]
    Cancelled,
}

impl SliceError {
    pub fn configuration(object: ObjectId, message: impl Into<String>) -> Self {
        SliceError::Configuration {
            object,
            message: message.into(),
        }
    }

    pub fn database(object: ObjectId, message: impl Into<String>) -> Self {
        SliceError::Database {
            object,
            message: message.into(),
        }
    }

    pub fn data(object: ObjectId, message: impl Into<String>) -> Self {
        SliceError::Data {
            object,
            message: message.into(),
        }
    }

    pub fn io(object: ObjectId, source: std::io::Error) -> Self {
        SliceError::Io { object, source }
    }

    /// The object id this error is attached to, if any; used by the CLI to
    /// print the "originating object id" the error policy calls for.
    pub fn object(&self) -> ObjectId {
        match self {
            SliceError::Configuration { object, .. }
            | SliceError::Io { object, .. }
            | SliceError::Database { object, .. }
            | SliceError::Data { object, .. } => object.clone(),
            SliceError::Cancelled => ObjectId::None,
        }
    }

    /// Short kind name, e.g. `"configuration"`, for single-line reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            SliceError::Configuration { .. } => "configuration",
            SliceError::Io { .. } => "io",
            SliceError::Database { .. } => "database",
            SliceError::Data { .. } => "data",
            SliceError::Cancelled => "cancelled",
        }
    }
}

pub type SliceResult<T> = Result<T, SliceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_display_includes_id() {
        assert_eq!(
            ObjectId::Segment("public.foo".into(), 3).to_string(),
            "segment public.foo/3"
        );
    }

    #[test]
    fn kind_is_stable_for_reporting() {
        let err = SliceError::configuration(ObjectId::Table("public.foo".into()), "missing");
        assert_eq!(err.kind(), "configuration");
        assert_eq!(err.object(), ObjectId::Table("public.foo".into()));
    }
}
