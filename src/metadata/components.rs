//! Component and dynamic zone expansion
//!
//! All component-like attributes of one owner share a single pivot,
//! `{owner_table}_components`, and are told apart by its `field` column.
//! Dynamic zone rows additionally record the component uid in
//! `component_type`, which is why `component_id` has no foreign key.

use super::builder::BuildContext;
use super::relations::{add_column, order_float};
use super::table::{
    ColumnRef, ForeignKey, Index, JoinColumn, JoinTable, MorphColumn, OnDelete, OrderDirection,
    RelationAttribute, ResolvedAttribute, ScalarColumn, TableMetadata,
};
use crate::error::Result;
use crate::identifier::{names, Suffix};
use crate::model::{ComponentAttribute, DynamicZoneAttribute, RelationKind, ScalarType};
use std::collections::BTreeMap;

/// Payload field that carries a dynamic zone entry's component uid
pub const COMPONENT_TYPE_FIELD: &str = "__component";

/// Physical names of an owner's shared component pivot
#[derive(Debug, Clone)]
pub(crate) struct ComponentPivot {
    table: String,
    entity_column: String,
    component_column: String,
    type_column: String,
    field_column: String,
    order_column: String,
}

impl ComponentPivot {
    fn join_table(&self, field: &str) -> JoinTable {
        JoinTable {
            name: self.table.clone(),
            join_column: JoinColumn::to_id(&self.entity_column),
            inverse_join_column: None,
            pivot_columns: vec![
                self.entity_column.clone(),
                self.component_column.clone(),
                self.field_column.clone(),
                self.type_column.clone(),
            ],
            order_column_name: Some(self.order_column.clone()),
            inverse_order_column_name: None,
            morph_column: None,
            on: BTreeMap::from([(self.field_column.clone(), field.to_string())]),
            order_by: BTreeMap::from([(self.order_column.clone(), OrderDirection::Asc)]),
        }
    }
}

pub(crate) fn expand_component(
    ctx: &mut BuildContext<'_>,
    owner: usize,
    name: &str,
    component: &ComponentAttribute,
) -> Result<()> {
    ctx.model_index(&component.component)?;
    let pivot = ensure_component_link(ctx, owner)?;

    let mut join_table = pivot.join_table(name);
    join_table.inverse_join_column = Some(JoinColumn::to_id(&pivot.component_column));

    let kind = if component.repeatable {
        RelationKind::OneToMany
    } else {
        RelationKind::OneToOne
    };
    let mut attribute = RelationAttribute::new(kind, Some(component.component.clone()));
    attribute.owner = true;
    attribute.join_table = Some(join_table);
    attribute.component = Some(component.component.clone());
    attribute.repeatable = component.repeatable;
    ctx.set_attribute(owner, name, ResolvedAttribute::Relation(attribute));
    Ok(())
}

pub(crate) fn expand_dynamic_zone(
    ctx: &mut BuildContext<'_>,
    owner: usize,
    name: &str,
    zone: &DynamicZoneAttribute,
) -> Result<()> {
    for component in &zone.components {
        ctx.model_index(component)?;
    }
    let pivot = ensure_component_link(ctx, owner)?;

    let mut join_table = pivot.join_table(name);
    join_table.morph_column = Some(MorphColumn {
        type_field: COMPONENT_TYPE_FIELD.to_string(),
        type_column: ColumnRef {
            name: pivot.type_column.clone(),
        },
        id_column: JoinColumn::to_id(&pivot.component_column),
    });

    let mut attribute = RelationAttribute::new(RelationKind::MorphToMany, None);
    attribute.owner = true;
    attribute.join_table = Some(join_table);
    attribute.components = zone.components.clone();
    ctx.set_attribute(owner, name, ResolvedAttribute::Relation(attribute));
    Ok(())
}

/// The owner's component pivot, created on first use.
fn ensure_component_link(ctx: &mut BuildContext<'_>, owner: usize) -> Result<ComponentPivot> {
    if let Some(pivot) = ctx.component_links.get(&owner) {
        return Ok(pivot.clone());
    }

    let models = ctx.models;
    let owner_table = ctx.table_name(owner);
    let table_id = names::component_table(&models[owner].table_name);

    let pivot = ComponentPivot {
        table: ctx.name(&table_id)?,
        entity_column: ctx.name(&names::fixed_column(names::ENTITY_ID_COLUMN))?,
        component_column: ctx.name(&names::fixed_column(names::COMPONENT_ID_COLUMN))?,
        type_column: ctx.name(&names::fixed_column(names::COMPONENT_TYPE_COLUMN))?,
        field_column: ctx.name(&names::fixed_column(names::FIELD_COLUMN))?,
        order_column: ctx.name(&names::fixed_column(names::ORDER_COLUMN))?,
    };

    let entity_fk = ctx.name(&names::table_object(&table_id, Suffix::EntityFk))?;
    let field_index = ctx.name(&names::table_object(&table_id, Suffix::FieldIndex))?;
    let type_index = ctx.name(&names::table_object(&table_id, Suffix::ComponentTypeIndex))?;
    let unique = ctx.name(&names::table_object(&table_id, Suffix::Unique))?;

    let mut table = TableMetadata::synthetic(&pivot.table);
    let id = ctx.id_column()?;
    add_column(&mut table, id);
    add_column(
        &mut table,
        ScalarColumn::new(ScalarType::Integer, &pivot.entity_column).unsigned(),
    );
    add_column(
        &mut table,
        ScalarColumn::new(ScalarType::Integer, &pivot.component_column).unsigned(),
    );
    add_column(&mut table, ScalarColumn::new(ScalarType::String, &pivot.type_column));
    add_column(&mut table, ScalarColumn::new(ScalarType::String, &pivot.field_column));
    add_column(&mut table, order_float(&pivot.order_column));

    table.indexes = vec![
        Index::new(field_index, vec![pivot.field_column.clone()]),
        Index::new(type_index, vec![pivot.type_column.clone()]),
        Index::new(&entity_fk, vec![pivot.entity_column.clone()]),
        Index::unique(
            unique,
            vec![
                pivot.entity_column.clone(),
                pivot.component_column.clone(),
                pivot.field_column.clone(),
                pivot.type_column.clone(),
            ],
        ),
    ];
    table.foreign_keys = vec![ForeignKey::to_id(
        entity_fk,
        &pivot.entity_column,
        owner_table,
        OnDelete::Cascade,
    )];

    ctx.add_synthetic(table)?;
    ctx.tables[owner].component_link = Some(pivot.table.clone());
    ctx.component_links.insert(owner, pivot.clone());
    log::debug!(
        "created component pivot '{}' for '{}'",
        pivot.table,
        models[owner].uid
    );
    Ok(pivot)
}
