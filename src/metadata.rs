//! Relational metadata compilation
//!
//! [`create_metadata`] turns an ordered list of [`Model`]s into one
//! [`TableMetadata`] per model plus one per synthetic table (relation pivots,
//! shared component pivots, shared morph pivots). The whole build either
//! succeeds or returns the first error; partial metadata is never returned.
//!
//! # Example
//!
//! ```
//! use relmeta::metadata::create_metadata;
//! use relmeta::model::{Association, AttributeDef, Model, Relation};
//! use relmeta::MetadataConfig;
//!
//! let complex = Model::new("api::complex.complex", "complex", "complexes").attribute(
//!     "complexhasonecomplex",
//!     AttributeDef::relation(Relation::OneToOne(Association::new("api::complex.complex"))),
//! );
//!
//! let metadata = create_metadata(&[complex], &MetadataConfig::unlimited()).unwrap();
//! let pivot = metadata.get("complexes_complexhasonecomplex_links").unwrap();
//! assert_eq!(
//!     pivot.columns().collect::<Vec<_>>(),
//!     vec!["complex_id", "id", "inv_complex_id"]
//! );
//! ```

mod builder;
mod components;
mod relations;
pub mod resolver;
mod table;

pub use builder::MetadataBuilder;
pub use components::COMPONENT_TYPE_FIELD;
pub use relations::MORPH_TYPE_FIELD;
pub use resolver::{resolve, RelationTask, Resolution, TaskKind};
pub use table::{
    ColumnRef, ForeignKey, Index, IndexType, JoinColumn, JoinTable, Lifecycles, MorphColumn,
    OnDelete, OrderDirection, RelationAttribute, RelationTag, ResolvedAttribute, ScalarColumn,
    TableMetadata,
};

use crate::config::MetadataConfig;
use crate::error::Result;
use crate::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compiled schema: table metadata keyed by uid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    tables: BTreeMap<String, TableMetadata>,
}

impl Metadata {
    pub(crate) fn new(tables: BTreeMap<String, TableMetadata>) -> Self {
        Self { tables }
    }

    pub fn get(&self, uid: &str) -> Option<&TableMetadata> {
        self.tables.get(uid)
    }

    /// Look a table up by its physical name
    pub fn find_by_table(&self, table_name: &str) -> Option<&TableMetadata> {
        self.tables.values().find(|t| t.table_name == table_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TableMetadata)> {
        self.tables.iter()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableMetadata> {
        self.tables.values()
    }

    pub fn uids(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, TableMetadata> {
        self.tables
    }
}

/// Compile `models` with the identifier limit from `config`.
pub fn create_metadata(models: &[Model], config: &MetadataConfig) -> Result<Metadata> {
    MetadataBuilder::new(*config).build(models)
}
