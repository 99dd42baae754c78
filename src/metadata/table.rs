//! Output types describing the compiled schema

use crate::model::{RelationKind, ScalarType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle hook name -> handler name, carried through from the model
pub type Lifecycles = BTreeMap<String, String>;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Everything a DDL generator or query builder needs to know about one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub uid: String,
    pub singular_name: String,
    pub table_name: String,
    pub attributes: BTreeMap<String, ResolvedAttribute>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
    pub column_to_attribute: BTreeMap<String, String>,
    #[serde(default)]
    pub lifecycles: Lifecycles,
    /// Shared component pivot of this table, when it has component attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_link: Option<String>,
}

impl TableMetadata {
    /// Empty metadata for a table, before attributes are resolved
    pub fn new(uid: impl Into<String>, singular_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            singular_name: singular_name.into(),
            table_name: table_name.into(),
            attributes: BTreeMap::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            column_to_attribute: BTreeMap::new(),
            lifecycles: Lifecycles::new(),
            component_link: None,
        }
    }

    /// Metadata for a compiler-generated table, whose uid is its table name
    pub fn synthetic(table_name: &str) -> Self {
        Self::new(table_name, table_name, table_name)
    }

    pub fn attribute(&self, name: &str) -> Option<&ResolvedAttribute> {
        self.attributes.get(name)
    }

    /// Attribute stored in `column`
    pub fn attribute_for_column(&self, column: &str) -> Option<&str> {
        self.column_to_attribute.get(column).map(String::as_str)
    }

    /// Physical column backing `attribute`, if it has one
    pub fn column_for_attribute(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).and_then(ResolvedAttribute::column_name)
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }

    /// Physical columns of this table, in attribute order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.attributes.values().filter_map(ResolvedAttribute::column_name)
    }
}

/// A resolved attribute: either a plain column or a relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedAttribute {
    Scalar(ScalarColumn),
    Relation(RelationAttribute),
}

impl ResolvedAttribute {
    /// Column stored on this attribute's own table
    pub fn column_name(&self) -> Option<&str> {
        match self {
            ResolvedAttribute::Scalar(column) => Some(&column.column_name),
            ResolvedAttribute::Relation(relation) if relation.owner => {
                relation.join_column.as_ref().map(|c| c.name.as_str())
            }
            ResolvedAttribute::Relation(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarColumn> {
        match self {
            ResolvedAttribute::Scalar(column) => Some(column),
            ResolvedAttribute::Relation(_) => None,
        }
    }

    pub fn as_relation(&self) -> Option<&RelationAttribute> {
        match self {
            ResolvedAttribute::Relation(relation) => Some(relation),
            ResolvedAttribute::Scalar(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarColumn {
    #[serde(rename = "type")]
    pub kind: ScalarType,
    pub column_name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unsigned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_to: Option<serde_json::Value>,
}

impl ScalarColumn {
    pub fn new(kind: ScalarType, column_name: impl Into<String>) -> Self {
        Self {
            kind,
            column_name: column_name.into(),
            required: false,
            unique: false,
            unsigned: false,
            default_to: None,
        }
    }

    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }
}

/// Serialized as the literal `"type": "relation"`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationTag {
    #[default]
    Relation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationAttribute {
    #[serde(rename = "type", default)]
    pub tag: RelationTag,
    pub relation: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inversed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph_by: Option<String>,
    /// Whether this side stores the relation
    #[serde(default, skip_serializing_if = "is_false")]
    pub owner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<JoinTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_column: Option<JoinColumn>,
    /// Component uid, for component attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub repeatable: bool,
    /// Allowed component uids, for dynamic zones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
}

impl RelationAttribute {
    pub fn new(relation: RelationKind, target: Option<String>) -> Self {
        Self {
            tag: RelationTag::Relation,
            relation,
            target,
            inversed_by: None,
            mapped_by: None,
            morph_by: None,
            owner: false,
            join_table: None,
            join_column: None,
            component: None,
            repeatable: false,
            components: Vec::new(),
        }
    }
}

/// Pivot table description attached to a relation attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTable {
    pub name: String,
    /// Column pointing back at the attribute's own table
    pub join_column: JoinColumn,
    /// Column pointing at the target table; absent for polymorphic pivots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_join_column: Option<JoinColumn>,
    pub pivot_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_order_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph_column: Option<MorphColumn>,
    /// Fixed column values selecting this attribute's rows in a shared pivot
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub on: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub order_by: BTreeMap<String, OrderDirection>,
}

impl JoinTable {
    /// The same pivot seen from the other side of the relation
    pub fn mirrored(&self) -> Self {
        Self {
            name: self.name.clone(),
            join_column: self
                .inverse_join_column
                .clone()
                .unwrap_or_else(|| self.join_column.clone()),
            inverse_join_column: Some(self.join_column.clone()),
            pivot_columns: self.pivot_columns.clone(),
            order_column_name: None,
            inverse_order_column_name: None,
            morph_column: None,
            on: self.on.clone(),
            order_by: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinColumn {
    pub name: String,
    pub referenced_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_table: Option<String>,
}

impl JoinColumn {
    /// A column referencing `id`
    pub fn to_id(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            referenced_column: crate::identifier::names::ID_COLUMN.to_string(),
            referenced_table: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorphColumn {
    /// Field of a row's payload carrying its concrete type
    pub type_field: String,
    pub type_column: ColumnRef,
    pub id_column: JoinColumn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Unique,
    Primary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<IndexType>,
}

impl Index {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            kind: None,
        }
    }

    pub fn unique(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            kind: Some(IndexType::Unique),
        }
    }

    pub fn is_unique(&self) -> bool {
        self.kind == Some(IndexType::Unique)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnDelete {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "NO ACTION")]
    NoAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<OnDelete>,
}

impl ForeignKey {
    /// Single-column foreign key to `referenced_table.id`
    pub fn to_id(
        name: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        on_delete: OnDelete,
    ) -> Self {
        Self {
            name: name.into(),
            columns: vec![column.into()],
            referenced_table: referenced_table.into(),
            referenced_columns: vec![crate::identifier::names::ID_COLUMN.to_string()],
            on_delete: Some(on_delete),
        }
    }
}
