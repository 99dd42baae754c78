//! Tests for dependency ordering and foreign key validation

use relmeta::{create_metadata, parse_models, MetadataConfig};
use relmeta_cli::dependency_ordering::{self, OrderingError, TableInfo};

#[test]
fn test_topological_sort_simple_chain() {
    let tables = vec![
        TableInfo::new("bank_transactions", ["bank_accounts"]),
        TableInfo::new("banks", Vec::<String>::new()),
        TableInfo::new("bank_accounts", ["banks"]),
    ];

    let sorted = dependency_ordering::topological_sort(&tables).unwrap();
    assert_eq!(sorted, vec!["banks", "bank_accounts", "bank_transactions"]);
}

#[test]
fn test_validate_foreign_key_references() {
    let tables = vec![
        TableInfo::new("bank_accounts", ["banks"]),
        TableInfo::new("bank_transactions", ["bank_accounts"]),
    ];

    match dependency_ordering::validate_foreign_key_references(&tables) {
        Err(OrderingError::DanglingReferences(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("'banks'"));
        }
        other => panic!("expected dangling reference, got {other:?}"),
    }

    let mut with_banks = tables.clone();
    with_banks.push(TableInfo::new("banks", Vec::<String>::new()));
    assert!(dependency_ordering::validate_foreign_key_references(&with_banks).is_ok());
}

#[test]
fn test_creation_order_from_metadata() {
    let models = parse_models(
        r#"[
            {
                "uid": "api::article.article", "singularName": "article", "tableName": "articles",
                "attributes": {
                    "author": { "type": "relation", "relation": "manyToOne", "target": "api::user.user", "useJoinTable": false },
                    "tags": { "type": "relation", "relation": "manyToMany", "target": "api::tag.tag" },
                    "parent": { "type": "relation", "relation": "oneToOne", "target": "api::article.article", "useJoinTable": false }
                }
            },
            { "uid": "api::user.user", "singularName": "user", "tableName": "users" },
            { "uid": "api::tag.tag", "singularName": "tag", "tableName": "tags" }
        ]"#,
    )
    .unwrap();
    let metadata = create_metadata(&models, &MetadataConfig::unlimited()).unwrap();

    let order = dependency_ordering::creation_order(&metadata).unwrap();
    assert_eq!(order, vec!["tags", "users", "articles", "articles_tags_links"]);

    let tables = dependency_ordering::tables_from_metadata(&metadata);
    let articles = tables.iter().find(|t| t.name == "articles").unwrap();
    assert_eq!(articles.dependencies, vec!["users"]);
}
