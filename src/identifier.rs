//! Database identifier generation
//!
//! Every physical name the compiler emits (tables, columns, indexes, foreign
//! keys) is produced from a logical [`Identifier`] by an
//! [`IdentifierGenerator`]. Names that fit within the configured maximum
//! length are returned unchanged. Longer names are truncated, tagged with a
//! hash of the full logical name and closed with their structural suffix, so
//! consumers can still recognize a `_links` table or an `_fk` index.
//!
//! # Example
//!
//! ```
//! use relmeta::identifier::shorten;
//!
//! let full = shorten(&["complexes", "complexhasonecomplex", "links"], 0).unwrap();
//! assert_eq!(full, "complexes_complexhasonecomplex_links");
//!
//! let short = shorten(&["complexes", "complexhasonecomplex", "links"], 25).unwrap();
//! assert_eq!(short.len(), 25);
//! assert!(short.ends_with("_links"));
//! ```

mod generator;
mod hash;
pub mod names;

pub use generator::IdentifierGenerator;
pub use hash::hash_fragment;

use crate::error::Result;
use std::fmt;

/// Separator placed between identifier parts
pub const SEPARATOR: &str = "_";

/// Width of the hash fragment appended to shortened names
pub const HASH_LENGTH: usize = 5;

/// Widest hash fragment tried while resolving collisions
pub const MAX_HASH_LENGTH: usize = 12;

/// Minimum number of characters kept from the readable prefix
pub const MIN_PREFIX_LENGTH: usize = 1;

/// Structural suffixes that survive shortening verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suffix {
    Links,
    Morphs,
    Components,
    Fk,
    InvFk,
    Unique,
    OrderFk,
    OrderInvFk,
    EntityFk,
    FieldIndex,
    ComponentTypeIndex,
    OrderIndex,
    IdColumnIndex,
    Id,
    Type,
    Order,
}

impl Suffix {
    const ALL: [Suffix; 16] = [
        Suffix::Links,
        Suffix::Morphs,
        Suffix::Components,
        Suffix::Fk,
        Suffix::InvFk,
        Suffix::Unique,
        Suffix::OrderFk,
        Suffix::OrderInvFk,
        Suffix::EntityFk,
        Suffix::FieldIndex,
        Suffix::ComponentTypeIndex,
        Suffix::OrderIndex,
        Suffix::IdColumnIndex,
        Suffix::Id,
        Suffix::Type,
        Suffix::Order,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Suffix::Links => "links",
            Suffix::Morphs => "morphs",
            Suffix::Components => "components",
            Suffix::Fk => "fk",
            Suffix::InvFk => "inv_fk",
            Suffix::Unique => "unique",
            Suffix::OrderFk => "order_fk",
            Suffix::OrderInvFk => "order_inv_fk",
            Suffix::EntityFk => "entity_fk",
            Suffix::FieldIndex => "field_index",
            Suffix::ComponentTypeIndex => "component_type_index",
            Suffix::OrderIndex => "order_index",
            Suffix::IdColumnIndex => "id_column_index",
            Suffix::Id => "id",
            Suffix::Type => "type",
            Suffix::Order => "order",
        }
    }

    /// Compact form used when the literal suffix leaves no room for a
    /// prefix and hash. Short suffixes are their own abbreviation.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Suffix::Components => "cmps",
            Suffix::OrderInvFk => "oifk",
            Suffix::EntityFk => "efk",
            Suffix::FieldIndex => "fidx",
            Suffix::ComponentTypeIndex => "ctidx",
            Suffix::OrderIndex => "oidx",
            Suffix::IdColumnIndex => "icidx",
            other => other.as_str(),
        }
    }

    /// Recognize a structural suffix from its literal text
    pub fn parse(text: &str) -> Option<Suffix> {
        Suffix::ALL.iter().copied().find(|s| s.as_str() == text)
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical name of a database object
///
/// The readable `parts` may be truncated when the name is too long; the
/// optional `suffix` never is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    parts: Vec<String>,
    suffix: Option<Suffix>,
}

impl Identifier {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
            suffix: None,
        }
    }

    /// Build an identifier from raw parts, treating a trailing structural
    /// suffix (`links`, `fk`, ...) as literal.
    pub fn from_parts(parts: &[&str]) -> Self {
        match parts.split_last() {
            Some((last, rest)) if !rest.is_empty() => match Suffix::parse(last) {
                Some(suffix) => Identifier::new(rest.iter().copied()).with_suffix(suffix),
                None => Identifier::new(parts.iter().copied()),
            },
            _ => Identifier::new(parts.iter().copied()),
        }
    }

    pub fn with_suffix(mut self, suffix: Suffix) -> Self {
        self.suffix = Some(suffix);
        self
    }

    /// Derive the identifier of an object named after this one, e.g. the
    /// `_fk` index of a `_links` table.
    pub fn child(&self, suffix: Suffix) -> Self {
        Self {
            parts: vec![self.full_name()],
            suffix: Some(suffix),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn suffix(&self) -> Option<Suffix> {
        self.suffix
    }

    /// Readable part of the name, without the suffix
    pub fn base_name(&self) -> String {
        self.parts.join(SEPARATOR)
    }

    /// The complete, un-truncated name
    pub fn full_name(&self) -> String {
        match self.suffix {
            Some(suffix) if self.parts.is_empty() => suffix.as_str().to_string(),
            Some(suffix) => format!("{}{}{}", self.base_name(), SEPARATOR, suffix),
            None => self.base_name(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Shorten a single name built from `parts` to at most `max_length` bytes.
///
/// A trailing part that names a structural suffix is kept verbatim.
/// `max_length == 0` disables shortening.
pub fn shorten(parts: &[&str], max_length: usize) -> Result<String> {
    IdentifierGenerator::new(max_length).generate(&Identifier::from_parts(parts))
}
