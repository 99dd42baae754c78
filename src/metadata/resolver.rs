//! Attribute resolution
//!
//! Scalars become columns on the spot. Anything that can touch another
//! table (relations, components, dynamic zones) is deferred as a
//! [`RelationTask`], because resolving it may create a pivot table and
//! write to the counterpart model's attributes.

use super::table::ScalarColumn;
use crate::error::Result;
use crate::identifier::{names, IdentifierGenerator};
use crate::model::{
    AttributeDef, ComponentAttribute, DynamicZoneAttribute, Relation, ScalarAttribute, ScalarType,
};

/// Outcome of resolving one attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Column(ScalarColumn),
    Task(RelationTask),
}

/// Deferred relation-like attribute, addressed by model index
#[derive(Debug, Clone, PartialEq)]
pub struct RelationTask {
    /// Index of the owning model in the build's input
    pub owner: usize,
    pub attribute: String,
    pub kind: TaskKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    Relation(Relation),
    Component(ComponentAttribute),
    DynamicZone(DynamicZoneAttribute),
}

/// Resolve attribute `name` of the model at index `owner`.
pub fn resolve(
    generator: &mut IdentifierGenerator,
    owner: usize,
    name: &str,
    definition: &AttributeDef,
) -> Result<Resolution> {
    let kind = match definition {
        AttributeDef::Scalar(scalar) => {
            return scalar_column(generator, name, scalar).map(Resolution::Column)
        }
        AttributeDef::Relation(relation) => TaskKind::Relation(relation.clone()),
        AttributeDef::Component(component) => TaskKind::Component(component.clone()),
        AttributeDef::DynamicZone(zone) => TaskKind::DynamicZone(zone.clone()),
    };

    Ok(Resolution::Task(RelationTask {
        owner,
        attribute: name.to_string(),
        kind,
    }))
}

pub(crate) fn scalar_column(
    generator: &mut IdentifierGenerator,
    name: &str,
    scalar: &ScalarAttribute,
) -> Result<ScalarColumn> {
    Ok(ScalarColumn {
        kind: scalar.kind,
        column_name: generator.generate(&names::column(name))?,
        required: scalar.required,
        unique: scalar.unique,
        unsigned: scalar.column.unsigned,
        default_to: scalar.column.default_to.clone(),
    })
}

/// Auto-increment surrogate key
pub(crate) fn id_column(generator: &mut IdentifierGenerator) -> Result<ScalarColumn> {
    let name = generator.generate(&names::fixed_column(names::ID_COLUMN))?;
    Ok(ScalarColumn::new(ScalarType::Increments, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Association;

    #[test]
    fn test_scalar_resolves_to_snake_case_column() {
        let mut generator = IdentifierGenerator::new(0);
        let resolution = resolve(
            &mut generator,
            0,
            "publishedAt",
            &AttributeDef::scalar(ScalarType::DateTime),
        )
        .unwrap();

        assert_eq!(
            resolution,
            Resolution::Column(ScalarColumn::new(ScalarType::DateTime, "published_at"))
        );
    }

    #[test]
    fn test_long_column_is_shortened() {
        let mut generator = IdentifierGenerator::new(20);
        let resolution = resolve(
            &mut generator,
            0,
            "averyveryverylongattributename",
            &AttributeDef::scalar(ScalarType::String),
        )
        .unwrap();

        match resolution {
            Resolution::Column(column) => {
                assert_eq!(column.column_name.len(), 20);
                assert!(column.column_name.starts_with("averyveryverylo"));
            }
            other => panic!("expected a column, got {other:?}"),
        }
    }

    #[test]
    fn test_relation_becomes_task() {
        let mut generator = IdentifierGenerator::new(0);
        let relation = Relation::ManyToOne(Association::new("api::user.user"));
        let resolution = resolve(&mut generator, 3, "author", &AttributeDef::relation(relation.clone()))
            .unwrap();

        assert_eq!(
            resolution,
            Resolution::Task(RelationTask {
                owner: 3,
                attribute: "author".to_string(),
                kind: TaskKind::Relation(relation),
            })
        );
        assert!(generator.is_empty());
    }
}
