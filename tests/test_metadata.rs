//! Whole-schema properties over the content type fixture

use relmeta::metadata::{OnDelete, ResolvedAttribute};
use relmeta::{create_metadata, parse_models, Metadata, MetadataConfig, Model, RelationKind};
use std::collections::HashSet;

const FIXTURE: &str = include_str!("fixtures/content_types.json");

fn models() -> Vec<Model> {
    parse_models(FIXTURE).unwrap()
}

fn compile(max_identifier_length: usize) -> Metadata {
    create_metadata(&models(), &MetadataConfig::new(max_identifier_length)).unwrap()
}

#[test]
fn test_builds_are_deterministic() {
    for max in [0, 25, 63] {
        let first = compile(max);
        let second = compile(max);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn test_expected_tables() {
    let metadata = compile(0);
    let uids: Vec<&str> = metadata.uids().collect();
    assert_eq!(
        uids,
        vec![
            "api::article.article",
            "api::comment.comment",
            "api::profile.profile",
            "api::tag.tag",
            "api::user.user",
            "articles_author_links",
            "articles_components",
            "articles_related_links",
            "articles_tags_links",
            "blocks.hero",
            "blocks.quote",
            "comments_morphs",
            "components_blocks_heroes_components",
            "shared.media",
            "shared.seo",
        ]
    );
}

#[test]
fn test_column_to_attribute_is_injective_and_complete() {
    for max in [0, 25] {
        let metadata = compile(max);
        for table in metadata.tables() {
            let columns: Vec<&str> = table.columns().collect();
            let unique: HashSet<&str> = columns.iter().copied().collect();
            assert_eq!(columns.len(), unique.len(), "{} repeats a column", table.uid);
            assert_eq!(table.column_to_attribute.len(), columns.len());

            for (column, attribute) in &table.column_to_attribute {
                assert_eq!(table.column_for_attribute(attribute), Some(column.as_str()));
            }
        }
    }
}

#[test]
fn test_every_model_has_an_id() {
    let metadata = compile(0);
    for table in metadata.tables() {
        assert_eq!(table.attribute_for_column("id"), Some("id"), "{}", table.uid);
    }
}

#[test]
fn test_names_fit_and_never_collide() {
    let metadata = compile(25);

    let mut table_names = HashSet::new();
    for table in metadata.tables() {
        assert!(table.table_name.len() <= 25, "{}", table.table_name);
        assert!(table_names.insert(table.table_name.as_str()));

        let names = table
            .columns()
            .chain(table.indexes.iter().map(|i| i.name.as_str()))
            .chain(table.foreign_keys.iter().map(|fk| fk.name.as_str()));
        for name in names {
            assert!(name.len() <= 25, "{name} on {} is too long", table.table_name);
        }
    }
}

#[test]
fn test_pivot_foreign_keys_cascade() {
    let metadata = compile(25);
    for table in metadata.tables().filter(|t| t.uid == t.table_name) {
        assert!(!table.foreign_keys.is_empty(), "{} has no foreign key", table.uid);
        for fk in &table.foreign_keys {
            assert_eq!(fk.on_delete, Some(OnDelete::Cascade), "{}", fk.name);
            assert!(metadata.find_by_table(&fk.referenced_table).is_some());
        }
    }
}

#[test]
fn test_bidirectional_relations_are_symmetric() {
    let metadata = compile(25);
    for table in metadata.tables() {
        for (name, attribute) in &table.attributes {
            let ResolvedAttribute::Relation(relation) = attribute else {
                continue;
            };
            let Some(inverse_name) = &relation.inversed_by else {
                continue;
            };

            let target = metadata.get(relation.target.as_deref().unwrap()).unwrap();
            let inverse = target.attribute(inverse_name).unwrap().as_relation().unwrap();
            assert_eq!(inverse.mapped_by.as_deref(), Some(name.as_str()));
            assert_eq!(inverse.target.as_deref(), Some(table.uid.as_str()));

            match (&relation.join_table, &inverse.join_table) {
                (Some(owner), Some(mirror)) => {
                    assert_eq!(owner.name, mirror.name);
                    assert_eq!(
                        Some(&owner.join_column),
                        mirror.inverse_join_column.as_ref()
                    );
                    assert_eq!(
                        owner.inverse_join_column.as_ref(),
                        Some(&mirror.join_column)
                    );
                    assert_eq!(owner.order_column_name, mirror.inverse_order_column_name);
                    assert_eq!(owner.inverse_order_column_name, mirror.order_column_name);
                }
                (None, None) => {
                    let owner_column = relation.join_column.as_ref().unwrap();
                    let inverse_column = inverse.join_column.as_ref().unwrap();
                    assert_eq!(inverse_column.referenced_column, owner_column.name);
                }
                other => panic!("asymmetric storage for {}.{name}: {other:?}", table.uid),
            }
        }
    }
}

#[test]
fn test_article_relations() {
    let metadata = compile(0);
    let article = metadata.get("api::article.article").unwrap();

    let author = article.attribute("author").unwrap().as_relation().unwrap();
    assert_eq!(author.relation, RelationKind::ManyToOne);
    let pivot = author.join_table.as_ref().unwrap();
    assert_eq!(pivot.name, "articles_author_links");
    assert_eq!(pivot.order_column_name, None);
    assert_eq!(pivot.inverse_order_column_name.as_deref(), Some("article_order"));

    let related = article.attribute("related").unwrap().as_relation().unwrap();
    let pivot = related.join_table.as_ref().unwrap();
    assert_eq!(pivot.join_column.name, "article_id");
    assert_eq!(pivot.inverse_join_column.as_ref().unwrap().name, "inv_article_id");
    assert_eq!(pivot.order_column_name.as_deref(), Some("article_order"));

    let comments = article.attribute("comments").unwrap().as_relation().unwrap();
    assert_eq!(comments.relation, RelationKind::MorphMany);
    assert_eq!(comments.morph_by.as_deref(), Some("subject"));

    assert_eq!(article.lifecycles.get("beforeCreate").map(String::as_str), Some("generateSlug"));
    assert_eq!(article.component_link.as_deref(), Some("articles_components"));
}

#[test]
fn test_profile_uses_join_column() {
    let metadata = compile(0);
    let users = metadata.get("api::user.user").unwrap();
    assert_eq!(users.attribute_for_column("profile_id"), Some("profile"));

    let fk = users.foreign_key("users_profile_id_fk").unwrap();
    assert_eq!(fk.referenced_table, "profiles");
    assert_eq!(fk.on_delete, Some(OnDelete::SetNull));

    let profile = metadata.get("api::profile.profile").unwrap();
    let user = profile.attribute("user").unwrap().as_relation().unwrap();
    assert_eq!(user.relation, RelationKind::OneToOne);
    assert!(!user.owner);
    assert_eq!(profile.column_for_attribute("user"), None);
}

#[test]
fn test_metadata_serializes_in_camel_case() {
    let metadata = compile(0);
    let value = serde_json::to_value(&metadata).unwrap();

    let pivot = &value["api::tag.tag"]["attributes"]["articles"]["joinTable"];
    assert_eq!(pivot["name"], "articles_tags_links");
    assert_eq!(pivot["joinColumn"]["name"], "inv_tag_id");
    assert_eq!(pivot["orderColumnName"], "article_order");
    assert_eq!(value["api::article.article"]["columnToAttribute"]["published_at"], "publishedAt");

    let back: Metadata = serde_json::from_value(value).unwrap();
    assert_eq!(back, metadata);
}
