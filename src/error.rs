//! Error types for metadata compilation
//!
//! Every variant is fatal: a build that hits one returns the error and no
//! metadata at all, since downstream DDL generation assumes the schema is
//! complete and consistent.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = MetadataError> = std::result::Result<T, E>;

/// Errors raised while compiling models into table metadata
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A relation, component or dynamic zone references a uid that is not in the input
    #[error("unknown target '{target}'")]
    UnknownTarget { target: String },

    /// The relation kind is not one the compiler knows how to lay out
    #[error("unsupported relation kind '{kind}'")]
    UnsupportedRelation { kind: String },

    /// No collision-free physical name fits within the configured limit
    #[error("identifier '{name}' cannot be shortened to {max_length} characters without collision")]
    IdentifierTooLong { name: String, max_length: usize },

    /// `mappedBy` / `inversedBy` / `morphBy` point at a missing or incompatible counterpart
    #[error("inconsistent inverse side: {reason}")]
    InconsistentInverse { reason: String },

    /// Two input models share the same uid
    #[error("duplicate model uid '{uid}'")]
    DuplicateModel { uid: String },

    /// Two tables resolve to the same physical table name or uid
    #[error("duplicate table '{table}'")]
    DuplicateTable { table: String },

    /// Two indexes, or two foreign keys, of one table share a name
    #[error("duplicate index or foreign key '{name}' on table '{table}'")]
    DuplicateConstraint { table: String, name: String },

    /// Two attributes of one table resolve to the same physical column
    #[error("attributes '{first}' and '{second}' of '{uid}' both map to column '{column}'")]
    DuplicateColumn {
        uid: String,
        column: String,
        first: String,
        second: String,
    },

    /// Model input could not be parsed or has an invalid shape
    #[error("invalid model definition: {0}")]
    InvalidModel(String),

    /// Failure on a specific attribute, tagged with where it happened
    #[error("error on attribute '{attribute}' in model '{uid}': {source}")]
    Attribute {
        uid: String,
        attribute: String,
        #[source]
        source: Box<MetadataError>,
    },
}

impl MetadataError {
    /// Tag this error with the model and attribute being resolved.
    ///
    /// Errors that already carry a location are returned unchanged so the
    /// innermost location wins.
    pub fn on_attribute(self, uid: &str, attribute: &str) -> Self {
        match self {
            MetadataError::Attribute { .. } => self,
            other => MetadataError::Attribute {
                uid: uid.to_string(),
                attribute: attribute.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, with any attribute location stripped
    pub fn root(&self) -> &MetadataError {
        match self {
            MetadataError::Attribute { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        MetadataError::InconsistentInverse {
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_target(target: &str) -> Self {
        MetadataError::UnknownTarget {
            target: target.to_string(),
        }
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(error: serde_json::Error) -> Self {
        MetadataError::InvalidModel(error.to_string())
    }
}
