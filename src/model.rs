//! Input models
//!
//! A [`Model`] is the declarative definition of a content type or component.
//! Models are usually loaded from JSON with [`parse_models`], but can be
//! assembled in code:
//!
//! ```
//! use relmeta::model::{Association, AttributeDef, Model, Relation, ScalarType};
//!
//! let article = Model::new("api::article.article", "article", "articles")
//!     .attribute("title", AttributeDef::scalar(ScalarType::String))
//!     .attribute(
//!         "tags",
//!         AttributeDef::relation(Relation::ManyToMany(Association::new("api::tag.tag"))),
//!     );
//! assert_eq!(article.attributes.len(), 2);
//! ```

mod attribute;
mod raw;

pub use attribute::{
    Association, AttributeDef, ColumnOptions, ComponentAttribute, DynamicZoneAttribute,
    MorphInverse, Relation, RelationKind, ScalarAttribute, ScalarType, Side,
};
pub use raw::{parse_model, parse_models};

use crate::metadata::{ForeignKey, Index, Lifecycles};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub uid: String,
    pub singular_name: String,
    pub table_name: String,
    pub attributes: BTreeMap<String, AttributeDef>,
    /// Extra indexes declared by the model itself
    pub indexes: Vec<Index>,
    /// Extra foreign keys declared by the model itself
    pub foreign_keys: Vec<ForeignKey>,
    pub lifecycles: Lifecycles,
}

impl Model {
    pub fn new(
        uid: impl Into<String>,
        singular_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            singular_name: singular_name.into(),
            table_name: table_name.into(),
            attributes: BTreeMap::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            lifecycles: Lifecycles::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, definition: AttributeDef) -> Self {
        self.attributes.insert(name.into(), definition);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }

    pub fn has_components(&self) -> bool {
        self.attributes.values().any(AttributeDef::is_component_like)
    }
}
