//! JSON model loading
//!
//! Models arrive in the content-type JSON shape, where every attribute is an
//! object whose `type` (and, for relations, `relation`) decides which other
//! keys matter. They are deserialized loosely here and then checked into the
//! typed [`AttributeDef`] union, so an unknown relation kind surfaces as
//! [`MetadataError::UnsupportedRelation`] rather than a generic parse error.

use super::{
    Association, AttributeDef, ColumnOptions, ComponentAttribute, DynamicZoneAttribute, Model,
    MorphInverse, Relation, RelationKind, ScalarAttribute, ScalarType, Side,
};
use crate::error::{MetadataError, Result};
use crate::metadata::{ForeignKey, Index, Lifecycles};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawModel {
    uid: String,
    singular_name: Option<String>,
    #[serde(default)]
    info: Option<RawInfo>,
    #[serde(alias = "collectionName")]
    table_name: String,
    #[serde(default)]
    attributes: BTreeMap<String, RawAttribute>,
    #[serde(default)]
    indexes: Vec<Index>,
    #[serde(default)]
    foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    lifecycles: Lifecycles,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInfo {
    singular_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttribute {
    #[serde(rename = "type")]
    kind: String,
    relation: Option<String>,
    target: Option<String>,
    inversed_by: Option<String>,
    mapped_by: Option<String>,
    morph_by: Option<String>,
    use_join_table: Option<bool>,
    join_table: Option<RawJoinTable>,
    component: Option<String>,
    #[serde(default)]
    repeatable: bool,
    #[serde(default)]
    components: Vec<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    column: ColumnOptions,
}

#[derive(Debug, Deserialize)]
struct RawJoinTable {
    name: String,
}

/// Parse a JSON array of models.
pub fn parse_models(json: &str) -> Result<Vec<Model>> {
    let raw: Vec<RawModel> = serde_json::from_str(json)?;
    raw.into_iter().map(Model::try_from).collect()
}

/// Parse a single JSON model.
pub fn parse_model(json: &str) -> Result<Model> {
    let raw: RawModel = serde_json::from_str(json)?;
    Model::try_from(raw)
}

impl TryFrom<RawModel> for Model {
    type Error = MetadataError;

    fn try_from(raw: RawModel) -> Result<Self> {
        let singular_name = raw
            .singular_name
            .or_else(|| raw.info.and_then(|info| info.singular_name))
            .ok_or_else(|| {
                MetadataError::InvalidModel(format!("model '{}' has no singularName", raw.uid))
            })?;

        let mut attributes = BTreeMap::new();
        for (name, attribute) in raw.attributes {
            let definition =
                AttributeDef::try_from(attribute).map_err(|e| e.on_attribute(&raw.uid, &name))?;
            attributes.insert(name, definition);
        }

        Ok(Model {
            uid: raw.uid,
            singular_name,
            table_name: raw.table_name,
            attributes,
            indexes: raw.indexes,
            foreign_keys: raw.foreign_keys,
            lifecycles: raw.lifecycles,
        })
    }
}

impl TryFrom<RawAttribute> for AttributeDef {
    type Error = MetadataError;

    fn try_from(raw: RawAttribute) -> Result<Self> {
        match raw.kind.as_str() {
            "relation" => relation(raw).map(AttributeDef::Relation),
            "component" => {
                let component = raw.component.ok_or_else(|| {
                    MetadataError::InvalidModel("component attribute without 'component'".into())
                })?;
                Ok(AttributeDef::Component(ComponentAttribute {
                    component,
                    repeatable: raw.repeatable,
                }))
            }
            "dynamiczone" => Ok(AttributeDef::DynamicZone(DynamicZoneAttribute {
                components: raw.components,
            })),
            other => Ok(AttributeDef::Scalar(ScalarAttribute {
                kind: other.parse::<ScalarType>()?,
                required: raw.required,
                unique: raw.unique,
                column: raw.column,
            })),
        }
    }
}

fn relation(raw: RawAttribute) -> Result<Relation> {
    let kind: RelationKind = raw
        .relation
        .as_deref()
        .ok_or_else(|| MetadataError::InvalidModel("relation attribute without 'relation'".into()))?
        .parse()?;

    let target = || {
        raw.target.clone().ok_or_else(|| {
            MetadataError::InvalidModel(format!("{kind} relation without 'target'"))
        })
    };

    let relation = match kind {
        RelationKind::MorphToOne => Relation::MorphToOne,
        RelationKind::MorphToMany => Relation::MorphToMany,
        RelationKind::MorphOne | RelationKind::MorphMany => {
            let morph = MorphInverse {
                target: target()?,
                morph_by: raw.morph_by.clone().ok_or_else(|| {
                    MetadataError::InvalidModel(format!("{kind} relation without 'morphBy'"))
                })?,
            };
            if kind == RelationKind::MorphOne {
                Relation::MorphOne(morph)
            } else {
                Relation::MorphMany(morph)
            }
        }
        RelationKind::OneToOne
        | RelationKind::OneToMany
        | RelationKind::ManyToOne
        | RelationKind::ManyToMany => {
            let side = match (raw.inversed_by.clone(), raw.mapped_by.clone()) {
                (Some(_), Some(_)) => {
                    return Err(MetadataError::inconsistent(
                        "a relation cannot declare both inversedBy and mappedBy",
                    ))
                }
                (Some(inversed_by), None) => Side::Owner { inversed_by },
                (None, Some(mapped_by)) => Side::Inverse { mapped_by },
                (None, None) => Side::Unidirectional,
            };
            let association = Association {
                target: target()?,
                side,
                use_join_table: raw.use_join_table.unwrap_or(true),
                join_table_name: raw.join_table.as_ref().map(|j| j.name.clone()),
            };
            match kind {
                RelationKind::OneToOne => Relation::OneToOne(association),
                RelationKind::OneToMany => Relation::OneToMany(association),
                RelationKind::ManyToOne => Relation::ManyToOne(association),
                _ => Relation::ManyToMany(association),
            }
        }
    };

    Ok(relation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_type_shape() {
        let model = parse_model(
            r#"{
                "uid": "api::complex.complex",
                "info": { "singularName": "complex" },
                "collectionName": "complexes",
                "attributes": {
                    "name": { "type": "string", "required": true },
                    "complexhasonecomplex": {
                        "type": "relation",
                        "relation": "oneToOne",
                        "target": "api::complex.complex"
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(model.singular_name, "complex");
        assert_eq!(model.table_name, "complexes");
        match model.get("name") {
            Some(AttributeDef::Scalar(scalar)) => {
                assert_eq!(scalar.kind, ScalarType::String);
                assert!(scalar.required);
            }
            other => panic!("unexpected attribute {other:?}"),
        }
        assert_eq!(
            model.get("complexhasonecomplex"),
            Some(&AttributeDef::Relation(Relation::OneToOne(Association::new(
                "api::complex.complex"
            ))))
        );
    }

    #[test]
    fn test_unknown_relation_kind_is_unsupported() {
        let err = parse_model(
            r#"{
                "uid": "api::post.post",
                "singularName": "post",
                "tableName": "posts",
                "attributes": {
                    "tags": { "type": "relation", "relation": "manyToSome", "target": "api::tag.tag" }
                }
            }"#,
        )
        .unwrap_err();

        assert_eq!(
            err.root(),
            &MetadataError::UnsupportedRelation {
                kind: "manyToSome".to_string()
            }
        );
    }

    #[test]
    fn test_both_sides_declared_is_inconsistent() {
        let err = parse_model(
            r#"{
                "uid": "api::post.post",
                "singularName": "post",
                "tableName": "posts",
                "attributes": {
                    "tags": {
                        "type": "relation",
                        "relation": "manyToMany",
                        "target": "api::tag.tag",
                        "inversedBy": "posts",
                        "mappedBy": "posts"
                    }
                }
            }"#,
        )
        .unwrap_err();

        assert!(matches!(err.root(), MetadataError::InconsistentInverse { .. }));
    }

    #[test]
    fn test_components_and_join_options() {
        let models = parse_models(
            r#"[{
                "uid": "api::page.page",
                "singularName": "page",
                "tableName": "pages",
                "attributes": {
                    "seo": { "type": "component", "component": "shared.seo" },
                    "blocks": { "type": "dynamiczone", "components": ["blocks.hero", "blocks.quote"] },
                    "author": {
                        "type": "relation",
                        "relation": "manyToOne",
                        "target": "api::author.author",
                        "useJoinTable": false
                    },
                    "related": {
                        "type": "relation",
                        "relation": "manyToMany",
                        "target": "api::page.page",
                        "joinTable": { "name": "page_relations" }
                    }
                }
            }]"#,
        )
        .unwrap();

        let page = &models[0];
        assert_eq!(page.get("seo"), Some(&AttributeDef::component("shared.seo", false)));
        assert_eq!(
            page.get("blocks"),
            Some(&AttributeDef::dynamic_zone(["blocks.hero", "blocks.quote"]))
        );
        assert_eq!(
            page.get("author"),
            Some(&AttributeDef::relation(Relation::ManyToOne(
                Association::new("api::author.author").without_join_table()
            )))
        );
        assert_eq!(
            page.get("related"),
            Some(&AttributeDef::relation(Relation::ManyToMany(
                Association::new("api::page.page").join_table("page_relations")
            )))
        );
        assert!(page.has_components());
    }

    #[test]
    fn test_unknown_scalar_type_is_invalid() {
        let err = parse_model(
            r#"{ "uid": "a", "singularName": "a", "tableName": "as",
                 "attributes": { "x": { "type": "hologram" } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err.root(), MetadataError::InvalidModel(_)));
    }
}
