//! Fatal build errors

use relmeta::{create_metadata, parse_models, MetadataConfig, MetadataError};

fn compile(json: &str, max_identifier_length: usize) -> Result<relmeta::Metadata, MetadataError> {
    let models = parse_models(json)?;
    create_metadata(&models, &MetadataConfig::new(max_identifier_length))
}

#[test]
fn test_unknown_relation_target() {
    let err = compile(
        r#"[{
            "uid": "api::post.post", "singularName": "post", "tableName": "posts",
            "attributes": {
                "author": { "type": "relation", "relation": "manyToOne", "target": "api::user.user" }
            }
        }]"#,
        0,
    )
    .unwrap_err();

    assert_eq!(
        err,
        MetadataError::Attribute {
            uid: "api::post.post".to_string(),
            attribute: "author".to_string(),
            source: Box::new(MetadataError::UnknownTarget {
                target: "api::user.user".to_string()
            }),
        }
    );
}

#[test]
fn test_unknown_component() {
    let err = compile(
        r#"[{
            "uid": "api::page.page", "singularName": "page", "tableName": "pages",
            "attributes": { "seo": { "type": "component", "component": "shared.seo" } }
        }]"#,
        0,
    )
    .unwrap_err();

    assert!(matches!(err.root(), MetadataError::UnknownTarget { target } if target == "shared.seo"));
}

#[test]
fn test_unsupported_relation_kind() {
    let err = compile(
        r#"[{
            "uid": "api::post.post", "singularName": "post", "tableName": "posts",
            "attributes": {
                "tags": { "type": "relation", "relation": "manyToSome", "target": "api::tag.tag" }
            }
        }]"#,
        0,
    )
    .unwrap_err();

    assert_eq!(
        err.root(),
        &MetadataError::UnsupportedRelation {
            kind: "manyToSome".to_string()
        }
    );
    assert!(err.to_string().contains("'tags'"));
}

#[test]
fn test_mapped_by_without_counterpart() {
    let err = compile(
        r#"[
            {
                "uid": "api::post.post", "singularName": "post", "tableName": "posts",
                "attributes": {
                    "tags": { "type": "relation", "relation": "manyToMany", "target": "api::tag.tag", "mappedBy": "posts" }
                }
            },
            { "uid": "api::tag.tag", "singularName": "tag", "tableName": "tags", "attributes": {} }
        ]"#,
        0,
    )
    .unwrap_err();

    assert!(matches!(err.root(), MetadataError::InconsistentInverse { .. }));
}

#[test]
fn test_counterpart_of_wrong_kind() {
    let err = compile(
        r#"[
            {
                "uid": "api::post.post", "singularName": "post", "tableName": "posts",
                "attributes": {
                    "author": { "type": "relation", "relation": "manyToOne", "target": "api::user.user", "inversedBy": "posts" }
                }
            },
            {
                "uid": "api::user.user", "singularName": "user", "tableName": "users",
                "attributes": {
                    "posts": { "type": "relation", "relation": "manyToMany", "target": "api::post.post", "mappedBy": "author" }
                }
            }
        ]"#,
        0,
    )
    .unwrap_err();

    assert!(matches!(err.root(), MetadataError::InconsistentInverse { .. }));
}

#[test]
fn test_both_sides_declared() {
    let err = compile(
        r#"[{
            "uid": "api::post.post", "singularName": "post", "tableName": "posts",
            "attributes": {
                "parent": {
                    "type": "relation", "relation": "oneToOne", "target": "api::post.post",
                    "inversedBy": "child", "mappedBy": "child"
                }
            }
        }]"#,
        0,
    )
    .unwrap_err();

    assert!(matches!(err.root(), MetadataError::InconsistentInverse { .. }));
}

#[test]
fn test_identifier_too_long() {
    let err = compile(
        r#"[{
            "uid": "api::post.post", "singularName": "post", "tableName": "posts",
            "attributes": {
                "tags": { "type": "relation", "relation": "manyToMany", "target": "api::post.post" }
            }
        }]"#,
        12,
    )
    .unwrap_err();

    assert!(matches!(err.root(), MetadataError::IdentifierTooLong { max_length: 12, .. }));
}

#[test]
fn test_malformed_json() {
    let err = compile(r#"[{ "uid": "api::post.post" }]"#, 0).unwrap_err();
    assert!(matches!(err, MetadataError::InvalidModel(_)));
}
