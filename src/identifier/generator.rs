//! Per-build identifier registry

use super::{hash_fragment, Identifier, HASH_LENGTH, MAX_HASH_LENGTH, MIN_PREFIX_LENGTH, SEPARATOR};
use crate::error::{MetadataError, Result};
use std::collections::HashMap;

/// Produces physical names for logical identifiers and remembers them.
///
/// One generator lives for exactly one build. Within it, the same logical
/// name always maps to the same physical name and two different logical
/// names never share one, even when both had to be truncated.
#[derive(Debug, Clone, Default)]
pub struct IdentifierGenerator {
    max_length: usize,
    /// full logical name -> physical name
    resolved: HashMap<String, String>,
    /// physical name -> full logical name
    taken: HashMap<String, String>,
}

impl IdentifierGenerator {
    /// Create an empty registry. `max_length == 0` disables shortening.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            resolved: HashMap::new(),
            taken: HashMap::new(),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Number of distinct logical names resolved so far
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Physical name previously produced for a full logical name
    pub fn lookup(&self, logical: &str) -> Option<&str> {
        self.resolved.get(logical).map(String::as_str)
    }

    /// Resolve `identifier` to its physical name, registering it.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::IdentifierTooLong`] when no collision-free
    /// name fits within the configured maximum length.
    pub fn generate(&mut self, identifier: &Identifier) -> Result<String> {
        let full = identifier.full_name();
        if let Some(existing) = self.resolved.get(&full) {
            return Ok(existing.clone());
        }

        let physical = self.fit(identifier, &full)?;
        self.taken.insert(physical.clone(), full.clone());
        self.resolved.insert(full, physical.clone());
        Ok(physical)
    }

    fn fit(&self, identifier: &Identifier, full: &str) -> Result<String> {
        if self.max_length == 0 {
            return Ok(full.to_string());
        }
        if full.len() <= self.max_length && !self.taken.contains_key(full) {
            return Ok(full.to_string());
        }

        let suffix = self.suffix_text(identifier);
        let base = identifier.base_name();

        for width in HASH_LENGTH..=MAX_HASH_LENGTH {
            let budget = match self.max_length.checked_sub(width + suffix.len()) {
                Some(budget) if budget >= MIN_PREFIX_LENGTH => budget,
                _ => break,
            };

            let candidate = format!(
                "{}{}{}",
                truncate(&base, budget),
                hash_fragment(full, width),
                suffix
            );
            match self.taken.get(&candidate) {
                None => {
                    log::trace!("shortened identifier '{full}' to '{candidate}'");
                    return Ok(candidate);
                }
                Some(owner) => {
                    log::debug!(
                        "identifier '{candidate}' already used by '{owner}', widening hash for '{full}'"
                    );
                }
            }
        }

        Err(MetadataError::IdentifierTooLong {
            name: full.to_string(),
            max_length: self.max_length,
        })
    }

    /// Literal suffix, or its abbreviation when the literal one leaves no
    /// room for a prefix and the narrowest hash.
    fn suffix_text(&self, identifier: &Identifier) -> String {
        let Some(suffix) = identifier.suffix() else {
            return String::new();
        };
        let literal = format!("{SEPARATOR}{suffix}");
        if literal.len() + HASH_LENGTH + MIN_PREFIX_LENGTH <= self.max_length {
            literal
        } else {
            format!("{SEPARATOR}{}", suffix.abbreviation())
        }
    }
}

/// Longest prefix of `text` that is at most `max_bytes` long and ends on a
/// character boundary.
fn truncate(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Suffix;

    fn links(table: &str, attribute: &str) -> Identifier {
        Identifier::new([table, attribute]).with_suffix(Suffix::Links)
    }

    #[test]
    fn test_same_logical_name_is_cached() {
        let mut generator = IdentifierGenerator::new(25);
        let first = generator.generate(&links("complexes", "complexhasonecomplex")).unwrap();
        let second = generator.generate(&links("complexes", "complexhasonecomplex")).unwrap();
        assert_eq!(first, second);
        assert_eq!(generator.len(), 1);
        assert_eq!(
            generator.lookup("complexes_complexhasonecomplex_links"),
            Some(first.as_str())
        );
    }

    #[test]
    fn test_short_names_pass_through() {
        let mut generator = IdentifierGenerator::new(63);
        assert_eq!(
            generator.generate(&Identifier::new(["complex"]).with_suffix(Suffix::Id)).unwrap(),
            "complex_id"
        );
    }

    #[test]
    fn test_similar_names_stay_distinct() {
        let mut generator = IdentifierGenerator::new(25);
        let mut seen = std::collections::HashSet::new();
        for i in 0..500 {
            let name = generator
                .generate(&links("complexes", &format!("complexhasmanycomplexes{i}")))
                .unwrap();
            assert!(name.len() <= 25, "{name} is too long");
            assert!(name.ends_with("_links"));
            assert!(seen.insert(name), "duplicate physical name");
        }
    }

    #[test]
    fn test_collision_with_existing_physical_name_widens_hash() {
        let mut generator = IdentifierGenerator::new(25);
        let long = links("complexes", "complexhasonecomplex");
        let predicted = format!(
            "complexes_comp{}_links",
            hash_fragment(&long.full_name(), HASH_LENGTH)
        );

        // A short logical name that happens to equal the predicted output
        let squatter = generator.generate(&Identifier::new([predicted.as_str()])).unwrap();
        assert_eq!(squatter, predicted);

        let resolved = generator.generate(&long).unwrap();
        assert_ne!(resolved, predicted);
        assert!(resolved.len() <= 25);
        assert!(resolved.ends_with(&format!(
            "{}_links",
            hash_fragment(&long.full_name(), HASH_LENGTH + 1)
        )));
    }

    #[test]
    fn test_too_long_when_suffix_leaves_no_room() {
        let mut generator = IdentifierGenerator::new(10);
        let err = generator
            .generate(&Identifier::new(["posts", "tags"]).with_suffix(Suffix::OrderInvFk))
            .unwrap_err();
        assert_eq!(
            err,
            MetadataError::IdentifierTooLong {
                name: "posts_tags_order_inv_fk".to_string(),
                max_length: 10,
            }
        );
    }

    #[test]
    fn test_long_suffix_abbreviated_only_when_needed() {
        let id = Identifier::new(["articles_components"]).with_suffix(Suffix::ComponentTypeIndex);

        let roomy = IdentifierGenerator::new(40).generate(&id).unwrap();
        assert_eq!(roomy, "articles_components_component_type_index");

        let literal = IdentifierGenerator::new(30).generate(&id).unwrap();
        assert!(literal.ends_with("_component_type_index"), "{literal}");
        assert_eq!(literal.len(), 30);

        let abbreviated = IdentifierGenerator::new(25).generate(&id).unwrap();
        assert!(abbreviated.ends_with("_ctidx"), "{abbreviated}");
        assert_eq!(abbreviated.len(), 25);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
    }
}
