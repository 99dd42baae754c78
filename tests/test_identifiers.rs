//! Identifier shortening through the public API

use relmeta::identifier::{hash_fragment, names, Identifier, IdentifierGenerator, Suffix};
use relmeta::{shorten, MetadataError};
use std::collections::HashSet;

#[test]
fn test_shorten_examples() {
    assert_eq!(
        shorten(&["complexes", "complexhasonecomplex", "links"], 0).unwrap(),
        "complexes_complexhasonecomplex_links"
    );

    let short = shorten(&["complexes", "complexhasonecomplex", "links"], 25).unwrap();
    assert_eq!(
        short,
        format!(
            "complexes_comp{}_links",
            hash_fragment("complexes_complexhasonecomplex_links", 5)
        )
    );
}

#[test]
fn test_shortened_name_is_stable_across_generators() {
    let id = names::join_table("components_default_compos", "singlecompo");
    let first = IdentifierGenerator::new(30).generate(&id).unwrap();
    let second = IdentifierGenerator::new(30).generate(&id).unwrap();
    assert_eq!(first, second);
    assert!(first.len() <= 30);
}

#[test]
fn test_many_similar_names_are_distinct() {
    let mut generator = IdentifierGenerator::new(25);
    let mut physical = HashSet::new();

    for i in 0..1000 {
        let table = names::join_table("complexes", &format!("complexHasManyComplexes{i}"));
        let index = names::table_object(&table, Suffix::OrderInvFk);
        for id in [table, index] {
            let name = generator.generate(&id).unwrap();
            assert!(name.len() <= 25, "{name}");
            assert!(physical.insert(name), "collision for {id}");
        }
    }
    assert_eq!(generator.len(), 2000);
}

#[test]
fn test_structural_suffix_survives() {
    let mut generator = IdentifierGenerator::new(20);
    for suffix in [Suffix::Fk, Suffix::Unique, Suffix::OrderFk, Suffix::Links] {
        let id = Identifier::new(["a_rather_long_table_name"]).with_suffix(suffix);
        let name = generator.generate(&id).unwrap();
        assert!(name.ends_with(&format!("_{suffix}")), "{name}");
    }
}

#[test]
fn test_long_suffix_is_abbreviated() {
    let name = shorten(&["pages", "components", "component_type_index"], 16).unwrap();
    assert_eq!(
        name,
        format!(
            "pages{}_ctidx",
            hash_fragment("pages_components_component_type_index", 5)
        )
    );
}

#[test]
fn test_suffix_longer_than_limit() {
    let err = shorten(&["components", "component_type_index"], 11).unwrap_err();
    assert_eq!(
        err,
        MetadataError::IdentifierTooLong {
            name: "components_component_type_index".to_string(),
            max_length: 11,
        }
    );
}

#[test]
fn test_multibyte_names_truncate_on_char_boundary() {
    let name = shorten(&["tablé_ñame_with_àccents", "links"], 20).unwrap();
    assert!(name.len() <= 20);
    assert!(name.ends_with("_links"));
}
