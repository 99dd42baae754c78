//! Attribute definitions of input models

use crate::error::MetadataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column types of scalar attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Increments,
    String,
    Text,
    RichText,
    Blocks,
    Email,
    Password,
    Uid,
    Enumeration,
    Json,
    Integer,
    BigInteger,
    Float,
    Decimal,
    Boolean,
    Date,
    Time,
    DateTime,
    Timestamp,
}

impl ScalarType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Increments => "increments",
            ScalarType::String => "string",
            ScalarType::Text => "text",
            ScalarType::RichText => "richtext",
            ScalarType::Blocks => "blocks",
            ScalarType::Email => "email",
            ScalarType::Password => "password",
            ScalarType::Uid => "uid",
            ScalarType::Enumeration => "enumeration",
            ScalarType::Json => "json",
            ScalarType::Integer => "integer",
            ScalarType::BigInteger => "biginteger",
            ScalarType::Float => "float",
            ScalarType::Decimal => "decimal",
            ScalarType::Boolean => "boolean",
            ScalarType::Date => "date",
            ScalarType::Time => "time",
            ScalarType::DateTime => "datetime",
            ScalarType::Timestamp => "timestamp",
        }
    }
}

impl FromStr for ScalarType {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "increments" => ScalarType::Increments,
            "string" => ScalarType::String,
            "text" => ScalarType::Text,
            "richtext" => ScalarType::RichText,
            "blocks" => ScalarType::Blocks,
            "email" => ScalarType::Email,
            "password" => ScalarType::Password,
            "uid" => ScalarType::Uid,
            "enumeration" => ScalarType::Enumeration,
            "json" => ScalarType::Json,
            "integer" => ScalarType::Integer,
            "biginteger" => ScalarType::BigInteger,
            "float" => ScalarType::Float,
            "decimal" => ScalarType::Decimal,
            "boolean" => ScalarType::Boolean,
            "date" => ScalarType::Date,
            "time" => ScalarType::Time,
            "datetime" => ScalarType::DateTime,
            "timestamp" => ScalarType::Timestamp,
            other => {
                return Err(MetadataError::InvalidModel(format!(
                    "unknown attribute type '{other}'"
                )))
            }
        };
        Ok(kind)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column-level options of a scalar attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOptions {
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default)]
    pub default_to: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarAttribute {
    pub kind: ScalarType,
    pub required: bool,
    pub unique: bool,
    pub column: ColumnOptions,
}

impl ScalarAttribute {
    pub fn new(kind: ScalarType) -> Self {
        Self {
            kind,
            required: false,
            unique: false,
            column: ColumnOptions::default(),
        }
    }
}

/// The eight relation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    MorphOne,
    MorphMany,
    MorphToOne,
    MorphToMany,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::OneToOne => "oneToOne",
            RelationKind::OneToMany => "oneToMany",
            RelationKind::ManyToOne => "manyToOne",
            RelationKind::ManyToMany => "manyToMany",
            RelationKind::MorphOne => "morphOne",
            RelationKind::MorphMany => "morphMany",
            RelationKind::MorphToOne => "morphToOne",
            RelationKind::MorphToMany => "morphToMany",
        }
    }

    /// `xToMany`: the owner holds many targets, so the pivot carries an order column
    pub fn is_any_to_many(self) -> bool {
        matches!(
            self,
            RelationKind::OneToMany | RelationKind::ManyToMany | RelationKind::MorphToMany
        )
    }

    /// `manyToX`: a target can be held by many owners
    pub fn is_many_to_any(self) -> bool {
        matches!(self, RelationKind::ManyToOne | RelationKind::ManyToMany)
    }

    /// Kind the other side of a bidirectional relation must declare
    pub fn counterpart(self) -> Option<RelationKind> {
        match self {
            RelationKind::OneToOne => Some(RelationKind::OneToOne),
            RelationKind::OneToMany => Some(RelationKind::ManyToOne),
            RelationKind::ManyToOne => Some(RelationKind::OneToMany),
            RelationKind::ManyToMany => Some(RelationKind::ManyToMany),
            _ => None,
        }
    }
}

impl FromStr for RelationKind {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "oneToOne" => RelationKind::OneToOne,
            "oneToMany" => RelationKind::OneToMany,
            "manyToOne" => RelationKind::ManyToOne,
            "manyToMany" => RelationKind::ManyToMany,
            "morphOne" => RelationKind::MorphOne,
            "morphMany" => RelationKind::MorphMany,
            "morphToOne" => RelationKind::MorphToOne,
            "morphToMany" => RelationKind::MorphToMany,
            other => {
                return Err(MetadataError::UnsupportedRelation {
                    kind: other.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of a relation an attribute declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Side {
    /// No counterpart attribute on the target
    Unidirectional,
    /// Owning side; `inversed_by` names the target's counterpart attribute
    Owner { inversed_by: String },
    /// Inverse side; `mapped_by` names the target's owning attribute
    Inverse { mapped_by: String },
}

/// A regular relation to another model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub target: String,
    pub side: Side,
    /// `false` stores an owning `oneToOne`/`manyToOne` in a FK column instead of a pivot
    pub use_join_table: bool,
    /// Explicit pivot table name, replacing `{table}_{attribute}_links`
    pub join_table_name: Option<String>,
}

impl Association {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            side: Side::Unidirectional,
            use_join_table: true,
            join_table_name: None,
        }
    }

    pub fn inversed_by(mut self, attribute: impl Into<String>) -> Self {
        self.side = Side::Owner {
            inversed_by: attribute.into(),
        };
        self
    }

    pub fn mapped_by(mut self, attribute: impl Into<String>) -> Self {
        self.side = Side::Inverse {
            mapped_by: attribute.into(),
        };
        self
    }

    pub fn without_join_table(mut self) -> Self {
        self.use_join_table = false;
        self
    }

    pub fn join_table(mut self, name: impl Into<String>) -> Self {
        self.join_table_name = Some(name.into());
        self
    }
}

/// Inverse side of a polymorphic relation, pointing at the target's morph attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphInverse {
    pub target: String,
    pub morph_by: String,
}

/// Relation attribute, one variant per kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    OneToOne(Association),
    OneToMany(Association),
    ManyToOne(Association),
    ManyToMany(Association),
    MorphOne(MorphInverse),
    MorphMany(MorphInverse),
    MorphToOne,
    MorphToMany,
}

impl Relation {
    pub fn kind(&self) -> RelationKind {
        match self {
            Relation::OneToOne(_) => RelationKind::OneToOne,
            Relation::OneToMany(_) => RelationKind::OneToMany,
            Relation::ManyToOne(_) => RelationKind::ManyToOne,
            Relation::ManyToMany(_) => RelationKind::ManyToMany,
            Relation::MorphOne(_) => RelationKind::MorphOne,
            Relation::MorphMany(_) => RelationKind::MorphMany,
            Relation::MorphToOne => RelationKind::MorphToOne,
            Relation::MorphToMany => RelationKind::MorphToMany,
        }
    }

    pub fn association(&self) -> Option<&Association> {
        match self {
            Relation::OneToOne(a)
            | Relation::OneToMany(a)
            | Relation::ManyToOne(a)
            | Relation::ManyToMany(a) => Some(a),
            _ => None,
        }
    }

    /// Target model uid; polymorphic owners have none
    pub fn target(&self) -> Option<&str> {
        match self {
            Relation::MorphOne(m) | Relation::MorphMany(m) => Some(&m.target),
            Relation::MorphToOne | Relation::MorphToMany => None,
            other => other.association().map(|a| a.target.as_str()),
        }
    }
}

/// A single or repeatable embedded component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentAttribute {
    pub component: String,
    pub repeatable: bool,
}

/// An ordered list of components of several allowed types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicZoneAttribute {
    pub components: Vec<String>,
}

/// One attribute of an input model
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeDef {
    Scalar(ScalarAttribute),
    Relation(Relation),
    Component(ComponentAttribute),
    DynamicZone(DynamicZoneAttribute),
}

impl AttributeDef {
    pub fn scalar(kind: ScalarType) -> Self {
        AttributeDef::Scalar(ScalarAttribute::new(kind))
    }

    pub fn relation(relation: Relation) -> Self {
        AttributeDef::Relation(relation)
    }

    pub fn component(component: impl Into<String>, repeatable: bool) -> Self {
        AttributeDef::Component(ComponentAttribute {
            component: component.into(),
            repeatable,
        })
    }

    pub fn dynamic_zone<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeDef::DynamicZone(DynamicZoneAttribute {
            components: components.into_iter().map(Into::into).collect(),
        })
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            AttributeDef::Relation(relation) => Some(relation),
            _ => None,
        }
    }

    /// Whether this attribute lives in the owner's component pivot
    pub fn is_component_like(&self) -> bool {
        matches!(self, AttributeDef::Component(_) | AttributeDef::DynamicZone(_))
    }
}
