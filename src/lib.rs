//! # relmeta
//!
//! Compiles declarative content-type models into relational metadata: one
//! table description per model, plus the pivot tables, indexes and foreign
//! keys that relations, components and dynamic zones need. Every physical
//! name goes through one per-build [`IdentifierGenerator`], so output stays
//! within the database's identifier limit and is identical across runs.
//!
//! ```
//! use relmeta::{create_metadata, parse_models, MetadataConfig};
//!
//! let models = parse_models(r#"[{
//!     "uid": "api::article.article",
//!     "singularName": "article",
//!     "tableName": "articles",
//!     "attributes": {
//!         "title": { "type": "string" },
//!         "tags": { "type": "relation", "relation": "manyToMany", "target": "api::article.article" }
//!     }
//! }]"#).unwrap();
//!
//! let metadata = create_metadata(&models, &MetadataConfig::new(63)).unwrap();
//! assert!(metadata.get("articles_tags_links").is_some());
//! ```

pub mod config;
pub mod error;
pub mod identifier;
pub mod metadata;
pub mod model;

pub use config::MetadataConfig;
pub use error::{MetadataError, Result};
pub use identifier::{shorten, Identifier, IdentifierGenerator, Suffix};
pub use metadata::{create_metadata, Metadata, MetadataBuilder, ResolvedAttribute, TableMetadata};
pub use model::{parse_model, parse_models, AttributeDef, Model, Relation, RelationKind};
