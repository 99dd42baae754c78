//! Logical names for every object the compiler creates
//!
//! These helpers only build [`Identifier`]s; turning them into physical names
//! is the job of the build's [`IdentifierGenerator`](super::IdentifierGenerator).

use super::{Identifier, Suffix};
use convert_case::{Case, Casing};

pub const ID_COLUMN: &str = "id";
pub const ORDER_COLUMN: &str = "order";
pub const FIELD_COLUMN: &str = "field";
pub const ENTITY_ID_COLUMN: &str = "entity_id";
pub const COMPONENT_ID_COLUMN: &str = "component_id";
pub const COMPONENT_TYPE_COLUMN: &str = "component_type";
pub const INVERSE_PREFIX: &str = "inv";
pub const MORPH_PREFIX: &str = "related";

pub fn snake(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// A model's own table
pub fn table(table_name: &str) -> Identifier {
    Identifier::new([table_name])
}

/// Column backing a scalar attribute
pub fn column(attribute: &str) -> Identifier {
    Identifier::new([snake(attribute)])
}

/// A column whose name is fixed by the compiler (`id`, `order`, ...)
pub fn fixed_column(name: &str) -> Identifier {
    Identifier::new([name])
}

/// `{owner_table}_{attribute}_links`
pub fn join_table(owner_table: &str, attribute: &str) -> Identifier {
    Identifier::new([owner_table.to_string(), snake(attribute)]).with_suffix(Suffix::Links)
}

/// `{owner_table}_morphs`, shared by every morph attribute of one owner
pub fn morph_table(owner_table: &str) -> Identifier {
    Identifier::new([owner_table]).with_suffix(Suffix::Morphs)
}

/// `{owner_table}_components`, shared by every component and dynamic zone of one owner
pub fn component_table(owner_table: &str) -> Identifier {
    Identifier::new([owner_table]).with_suffix(Suffix::Components)
}

/// `{singular}_id`
pub fn join_column(singular_name: &str) -> Identifier {
    Identifier::new([snake(singular_name)]).with_suffix(Suffix::Id)
}

/// `inv_{singular}_id`
pub fn inverse_join_column(singular_name: &str) -> Identifier {
    Identifier::new([INVERSE_PREFIX.to_string(), snake(singular_name)]).with_suffix(Suffix::Id)
}

/// `{singular}_order`
pub fn order_column(singular_name: &str) -> Identifier {
    Identifier::new([snake(singular_name)]).with_suffix(Suffix::Order)
}

/// `inv_{singular}_order`
pub fn inverse_order_column(singular_name: &str) -> Identifier {
    Identifier::new([INVERSE_PREFIX.to_string(), snake(singular_name)]).with_suffix(Suffix::Order)
}

/// `{attribute}_id` on the owner table when a relation uses a plain FK column
pub fn relation_column(attribute: &str) -> Identifier {
    Identifier::new([snake(attribute)]).with_suffix(Suffix::Id)
}

/// `related_id` in a morph pivot
pub fn morph_id_column() -> Identifier {
    Identifier::new([MORPH_PREFIX]).with_suffix(Suffix::Id)
}

/// `related_type` in a morph pivot
pub fn morph_type_column() -> Identifier {
    Identifier::new([MORPH_PREFIX]).with_suffix(Suffix::Type)
}

/// Index or constraint named after a table, e.g. `{table}_fk`
pub fn table_object(table: &Identifier, suffix: Suffix) -> Identifier {
    table.child(suffix)
}

/// Index or constraint named after one column of a table, e.g. `{table}_{column}_fk`
pub fn column_object(table: &Identifier, column: &Identifier, suffix: Suffix) -> Identifier {
    Identifier::new([table.full_name(), column.full_name()]).with_suffix(suffix)
}
