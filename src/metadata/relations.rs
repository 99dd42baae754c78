//! Relation expansion
//!
//! Decides, per relation kind and side, where a relation is stored and
//! materializes the pivot tables it needs:
//!
//! | kind                      | storage                                        |
//! |---------------------------|------------------------------------------------|
//! | `oneToOne` / `manyToOne`  | `_links` pivot, or an `{attr}_id` FK column     |
//! | `oneToMany` (one-way)     | `_links` pivot                                 |
//! | `oneToMany` (`mappedBy`)  | the `manyToOne` owner's storage                |
//! | `manyToMany`              | `_links` pivot with an order column per side   |
//! | `morphToOne/ToMany`       | the owner's shared `_morphs` pivot             |
//! | `morphOne/Many`           | the target's morph attribute (`morphBy`)       |
//!
//! The inverse side of a bidirectional relation never creates anything; the
//! owning side writes the inverse attribute with the same pivot and its
//! join columns swapped.

use super::builder::BuildContext;
use super::table::{
    ColumnRef, ForeignKey, Index, JoinColumn, JoinTable, MorphColumn, OnDelete, OrderDirection,
    RelationAttribute, ResolvedAttribute, ScalarColumn, TableMetadata,
};
use crate::error::{MetadataError, Result};
use crate::identifier::{names, Suffix};
use crate::model::{Association, MorphInverse, Relation, RelationKind, ScalarType, Side};
use std::collections::BTreeMap;

/// Payload field that carries a morph row's concrete type
pub const MORPH_TYPE_FIELD: &str = "__type";

/// Physical names of an owner's shared morph pivot
#[derive(Debug, Clone)]
pub(crate) struct MorphPivot {
    table: String,
    join_column: String,
    id_column: String,
    type_column: String,
    field_column: String,
    order_column: String,
}

pub(crate) fn expand(
    ctx: &mut BuildContext<'_>,
    owner: usize,
    name: &str,
    relation: &Relation,
) -> Result<()> {
    let kind = relation.kind();
    match relation {
        Relation::OneToOne(assoc) | Relation::ManyToMany(assoc) => match &assoc.side {
            Side::Inverse { mapped_by } => inverse_side(ctx, owner, name, kind, assoc, mapped_by),
            _ => owning_side(ctx, owner, name, kind, assoc),
        },
        Relation::OneToMany(assoc) => match &assoc.side {
            Side::Owner { .. } => Err(MetadataError::inconsistent(
                "the one side of a oneToMany cannot own a bidirectional relation; \
                 use mappedBy here and inversedBy on the manyToOne",
            )),
            Side::Inverse { mapped_by } => inverse_side(ctx, owner, name, kind, assoc, mapped_by),
            Side::Unidirectional => owning_side(ctx, owner, name, kind, assoc),
        },
        Relation::ManyToOne(assoc) => match &assoc.side {
            Side::Inverse { .. } => Err(MetadataError::inconsistent(
                "the many side of a manyToOne must be the owning side",
            )),
            _ => owning_side(ctx, owner, name, kind, assoc),
        },
        Relation::MorphToOne | Relation::MorphToMany => morph_to(ctx, owner, name, kind),
        Relation::MorphOne(morph) | Relation::MorphMany(morph) => {
            morph_inverse(ctx, owner, name, kind, morph)
        }
    }
}

fn owning_side(
    ctx: &mut BuildContext<'_>,
    owner: usize,
    name: &str,
    kind: RelationKind,
    assoc: &Association,
) -> Result<()> {
    let target = ctx.model_index(&assoc.target)?;

    let inverse = match &assoc.side {
        Side::Owner { inversed_by } => {
            check_owner_counterpart(ctx, owner, name, kind, target, inversed_by)?;
            Some(inversed_by.as_str())
        }
        _ => None,
    };

    let column_allowed = matches!(kind, RelationKind::OneToOne | RelationKind::ManyToOne);
    if !assoc.use_join_table && column_allowed {
        return create_join_column(ctx, owner, name, kind, target, inverse);
    }
    if !assoc.use_join_table {
        log::warn!(
            "useJoinTable: false is ignored on {kind} attribute '{name}' of '{}'",
            ctx.models[owner].uid
        );
    }
    create_join_table(ctx, owner, name, kind, assoc, target, inverse)
}

/// The inverse side only validates its counterpart; the owner fills it in.
fn inverse_side(
    ctx: &mut BuildContext<'_>,
    owner: usize,
    name: &str,
    kind: RelationKind,
    assoc: &Association,
    mapped_by: &str,
) -> Result<()> {
    let target = ctx.model_index(&assoc.target)?;
    let expected = kind.counterpart().ok_or_else(|| {
        MetadataError::inconsistent(format!("{kind} relations cannot declare mappedBy"))
    })?;

    let counterpart = find_counterpart(ctx, owner, target, mapped_by, expected)?;
    match &counterpart.side {
        Side::Owner { inversed_by } if inversed_by == name => {}
        _ => {
            return Err(MetadataError::inconsistent(format!(
                "'{}.{mapped_by}' must declare inversedBy '{name}'",
                ctx.models[target].uid
            )))
        }
    }

    let mut attribute = RelationAttribute::new(kind, Some(assoc.target.clone()));
    attribute.mapped_by = Some(mapped_by.to_string());
    ctx.set_attribute_if_absent(owner, name, ResolvedAttribute::Relation(attribute));
    Ok(())
}

fn check_owner_counterpart(
    ctx: &BuildContext<'_>,
    owner: usize,
    name: &str,
    kind: RelationKind,
    target: usize,
    inversed_by: &str,
) -> Result<()> {
    let expected = kind.counterpart().ok_or_else(|| {
        MetadataError::inconsistent(format!("{kind} relations cannot declare inversedBy"))
    })?;

    let counterpart = find_counterpart(ctx, owner, target, inversed_by, expected)?;
    match &counterpart.side {
        Side::Inverse { mapped_by } if mapped_by == name => Ok(()),
        _ => Err(MetadataError::inconsistent(format!(
            "'{}.{inversed_by}' must declare mappedBy '{name}'",
            ctx.models[target].uid
        ))),
    }
}

/// Counterpart `attribute` on the target model, which must be a relation of
/// kind `expected` pointing back at the owner.
fn find_counterpart<'a>(
    ctx: &BuildContext<'a>,
    owner: usize,
    target: usize,
    attribute: &str,
    expected: RelationKind,
) -> Result<&'a Association> {
    let models = ctx.models;
    let owner_uid = &models[owner].uid;
    let target_model = &models[target];

    let relation = target_model
        .get(attribute)
        .ok_or_else(|| {
            MetadataError::inconsistent(format!(
                "attribute '{attribute}' not found in '{}'",
                target_model.uid
            ))
        })?
        .as_relation()
        .ok_or_else(|| {
            MetadataError::inconsistent(format!(
                "'{}.{attribute}' is not a relation",
                target_model.uid
            ))
        })?;

    if relation.kind() != expected {
        return Err(MetadataError::inconsistent(format!(
            "'{}.{attribute}' is a {} relation, expected {expected}",
            target_model.uid,
            relation.kind()
        )));
    }

    let assoc = relation.association().ok_or_else(|| {
        MetadataError::inconsistent(format!("'{}.{attribute}' has no target", target_model.uid))
    })?;
    if &assoc.target != owner_uid {
        return Err(MetadataError::inconsistent(format!(
            "'{}.{attribute}' targets '{}', expected '{owner_uid}'",
            target_model.uid, assoc.target
        )));
    }

    Ok(assoc)
}

fn create_join_table(
    ctx: &mut BuildContext<'_>,
    owner: usize,
    name: &str,
    kind: RelationKind,
    assoc: &Association,
    target: usize,
    inverse: Option<&str>,
) -> Result<()> {
    let models = ctx.models;
    let (owner_model, target_model) = (&models[owner], &models[target]);
    let owner_table = ctx.table_name(owner);
    let target_table = ctx.table_name(target);

    let table_id = match &assoc.join_table_name {
        Some(explicit) => names::table(explicit),
        None => names::join_table(&owner_model.table_name, name),
    };
    let table_name = ctx.name(&table_id)?;
    let join_column = ctx.name(&names::join_column(&owner_model.singular_name))?;
    let inverse_join_column = ctx.name(&names::inverse_join_column(&target_model.singular_name))?;

    let order_id = names::order_column(&target_model.singular_name);
    let mut inverse_order_id = names::order_column(&owner_model.singular_name);
    if inverse_order_id == order_id {
        inverse_order_id = names::inverse_order_column(&owner_model.singular_name);
    }

    let fk_name = ctx.name(&names::table_object(&table_id, Suffix::Fk))?;
    let inv_fk_name = ctx.name(&names::table_object(&table_id, Suffix::InvFk))?;
    let unique_name = ctx.name(&names::table_object(&table_id, Suffix::Unique))?;

    let mut pivot = TableMetadata::synthetic(&table_name);
    let id = ctx.id_column()?;
    add_column(&mut pivot, id);
    add_column(&mut pivot, ScalarColumn::new(ScalarType::Integer, &join_column).unsigned());
    add_column(
        &mut pivot,
        ScalarColumn::new(ScalarType::Integer, &inverse_join_column).unsigned(),
    );
    pivot.indexes = vec![
        Index::new(&fk_name, vec![join_column.clone()]),
        Index::new(&inv_fk_name, vec![inverse_join_column.clone()]),
        Index::unique(
            unique_name,
            vec![join_column.clone(), inverse_join_column.clone()],
        ),
    ];
    pivot.foreign_keys = vec![
        ForeignKey::to_id(fk_name, &join_column, owner_table, OnDelete::Cascade),
        ForeignKey::to_id(inv_fk_name, &inverse_join_column, target_table, OnDelete::Cascade),
    ];

    let mut join_table = JoinTable {
        name: table_name.clone(),
        join_column: JoinColumn::to_id(&join_column),
        inverse_join_column: Some(JoinColumn::to_id(&inverse_join_column)),
        pivot_columns: vec![join_column, inverse_join_column],
        order_column_name: None,
        inverse_order_column_name: None,
        morph_column: None,
        on: BTreeMap::new(),
        order_by: BTreeMap::new(),
    };

    // the owner holds many targets: keep their order
    let mut order_column = None;
    if kind.is_any_to_many() {
        let column = ctx.name(&order_id)?;
        let index = ctx.name(&names::table_object(&table_id, Suffix::OrderFk))?;
        add_column(&mut pivot, order_float(&column));
        pivot.indexes.push(Index::new(index, vec![column.clone()]));
        join_table.order_column_name = Some(column.clone());
        join_table.order_by.insert(column.clone(), OrderDirection::Asc);
        order_column = Some(column);
    }

    // each target holds many owners: the inverse side keeps its own order
    let mut inverse_order_column = None;
    if inverse.is_some() && kind.is_many_to_any() {
        let column = ctx.name(&inverse_order_id)?;
        let index = ctx.name(&names::table_object(&table_id, Suffix::OrderInvFk))?;
        add_column(&mut pivot, order_float(&column));
        pivot.indexes.push(Index::new(index, vec![column.clone()]));
        join_table.inverse_order_column_name = Some(column.clone());
        inverse_order_column = Some(column);
    }

    ctx.add_synthetic(pivot)?;
    log::debug!(
        "{kind} '{}.{name}' -> '{}' via pivot '{table_name}'",
        owner_model.uid,
        target_model.uid
    );

    if let Some(inverse_name) = inverse {
        let mut mirrored = join_table.mirrored();
        if let Some(column) = inverse_order_column {
            mirrored.order_by.insert(column.clone(), OrderDirection::Asc);
            mirrored.order_column_name = Some(column);
        }
        mirrored.inverse_order_column_name = order_column;

        let inverse_kind = kind.counterpart().unwrap_or(kind);
        let mut attribute = RelationAttribute::new(inverse_kind, Some(owner_model.uid.clone()));
        attribute.mapped_by = Some(name.to_string());
        attribute.join_table = Some(mirrored);
        ctx.set_attribute(target, inverse_name, ResolvedAttribute::Relation(attribute));
    }

    let mut attribute = RelationAttribute::new(kind, Some(target_model.uid.clone()));
    attribute.owner = true;
    attribute.inversed_by = inverse.map(str::to_string);
    attribute.join_table = Some(join_table);
    ctx.set_attribute(owner, name, ResolvedAttribute::Relation(attribute));

    Ok(())
}

/// Store an owning `oneToOne`/`manyToOne` in an `{attr}_id` column of the owner table.
fn create_join_column(
    ctx: &mut BuildContext<'_>,
    owner: usize,
    name: &str,
    kind: RelationKind,
    target: usize,
    inverse: Option<&str>,
) -> Result<()> {
    let models = ctx.models;
    let (owner_model, target_model) = (&models[owner], &models[target]);
    let owner_table = ctx.table_name(owner);
    let target_table = ctx.table_name(target);

    let column_id = names::relation_column(name);
    let column = ctx.name(&column_id)?;
    let fk_name = ctx.name(&names::column_object(
        &names::table(&owner_model.table_name),
        &column_id,
        Suffix::Fk,
    ))?;

    let table = &mut ctx.tables[owner];
    table.indexes.push(Index::new(&fk_name, vec![column.clone()]));
    table.foreign_keys.push(ForeignKey::to_id(
        fk_name,
        &column,
        &target_table,
        OnDelete::SetNull,
    ));

    if let Some(inverse_name) = inverse {
        let inverse_kind = kind.counterpart().unwrap_or(kind);
        let mut attribute = RelationAttribute::new(inverse_kind, Some(owner_model.uid.clone()));
        attribute.mapped_by = Some(name.to_string());
        attribute.join_column = Some(JoinColumn {
            name: names::ID_COLUMN.to_string(),
            referenced_column: column.clone(),
            referenced_table: Some(owner_table),
        });
        ctx.set_attribute(target, inverse_name, ResolvedAttribute::Relation(attribute));
    }

    let mut attribute = RelationAttribute::new(kind, Some(target_model.uid.clone()));
    attribute.owner = true;
    attribute.inversed_by = inverse.map(str::to_string);
    attribute.join_column = Some(JoinColumn {
        name: column,
        referenced_column: names::ID_COLUMN.to_string(),
        referenced_table: Some(target_table),
    });
    ctx.set_attribute(owner, name, ResolvedAttribute::Relation(attribute));

    Ok(())
}

/// `morphToOne` / `morphToMany`: rows live in the owner's shared morph pivot,
/// selected by `field`.
fn morph_to(ctx: &mut BuildContext<'_>, owner: usize, name: &str, kind: RelationKind) -> Result<()> {
    let pivot = morph_pivot(ctx, owner)?;

    let mut join_table = JoinTable {
        name: pivot.table,
        join_column: JoinColumn::to_id(&pivot.join_column),
        inverse_join_column: None,
        pivot_columns: vec![
            pivot.join_column,
            pivot.type_column.clone(),
            pivot.id_column.clone(),
        ],
        order_column_name: None,
        inverse_order_column_name: None,
        morph_column: Some(MorphColumn {
            type_field: MORPH_TYPE_FIELD.to_string(),
            type_column: ColumnRef {
                name: pivot.type_column,
            },
            id_column: JoinColumn::to_id(pivot.id_column),
        }),
        on: BTreeMap::from([(pivot.field_column, name.to_string())]),
        order_by: BTreeMap::new(),
    };
    if kind == RelationKind::MorphToMany {
        join_table
            .order_by
            .insert(pivot.order_column.clone(), OrderDirection::Asc);
        join_table.order_column_name = Some(pivot.order_column);
    }

    let mut attribute = RelationAttribute::new(kind, None);
    attribute.owner = true;
    attribute.join_table = Some(join_table);
    ctx.set_attribute(owner, name, ResolvedAttribute::Relation(attribute));
    Ok(())
}

/// Create the owner's `_morphs` pivot on first use.
fn morph_pivot(ctx: &mut BuildContext<'_>, owner: usize) -> Result<MorphPivot> {
    if let Some(pivot) = ctx.morph_links.get(&owner) {
        return Ok(pivot.clone());
    }

    let models = ctx.models;
    let owner_model = &models[owner];
    let owner_table = ctx.table_name(owner);
    let table_id = names::morph_table(&owner_model.table_name);

    let mut join_id = names::join_column(&owner_model.singular_name);
    if join_id == names::morph_id_column() {
        join_id = names::inverse_join_column(&owner_model.singular_name);
    }

    let pivot = MorphPivot {
        table: ctx.name(&table_id)?,
        join_column: ctx.name(&join_id)?,
        id_column: ctx.name(&names::morph_id_column())?,
        type_column: ctx.name(&names::morph_type_column())?,
        field_column: ctx.name(&names::fixed_column(names::FIELD_COLUMN))?,
        order_column: ctx.name(&names::fixed_column(names::ORDER_COLUMN))?,
    };

    let fk_name = ctx.name(&names::table_object(&table_id, Suffix::Fk))?;
    let order_index = ctx.name(&names::table_object(&table_id, Suffix::OrderIndex))?;
    let id_index = ctx.name(&names::table_object(&table_id, Suffix::IdColumnIndex))?;
    let field_index = ctx.name(&names::table_object(&table_id, Suffix::FieldIndex))?;

    let mut table = TableMetadata::synthetic(&pivot.table);
    let id = ctx.id_column()?;
    add_column(&mut table, id);
    add_column(
        &mut table,
        ScalarColumn::new(ScalarType::Integer, &pivot.join_column).unsigned(),
    );
    add_column(
        &mut table,
        ScalarColumn::new(ScalarType::Integer, &pivot.id_column).unsigned(),
    );
    add_column(&mut table, ScalarColumn::new(ScalarType::String, &pivot.type_column));
    add_column(&mut table, ScalarColumn::new(ScalarType::String, &pivot.field_column));
    add_column(&mut table, order_float(&pivot.order_column));
    table.indexes = vec![
        Index::new(&fk_name, vec![pivot.join_column.clone()]),
        Index::new(order_index, vec![pivot.order_column.clone()]),
        Index::new(id_index, vec![pivot.id_column.clone()]),
        Index::new(field_index, vec![pivot.field_column.clone()]),
    ];
    table.foreign_keys = vec![ForeignKey::to_id(
        fk_name,
        &pivot.join_column,
        owner_table,
        OnDelete::Cascade,
    )];

    ctx.add_synthetic(table)?;
    ctx.morph_links.insert(owner, pivot.clone());
    Ok(pivot)
}

/// `morphOne` / `morphMany`: nothing is stored here, but `morphBy` must name
/// a polymorphic attribute on the target.
fn morph_inverse(
    ctx: &mut BuildContext<'_>,
    owner: usize,
    name: &str,
    kind: RelationKind,
    morph: &MorphInverse,
) -> Result<()> {
    let target = ctx.model_index(&morph.target)?;
    let models = ctx.models;
    let target_model = &models[target];

    let morph_kind = target_model
        .get(&morph.morph_by)
        .ok_or_else(|| {
            MetadataError::inconsistent(format!(
                "morph attribute '{}' not found in '{}'",
                morph.morph_by, target_model.uid
            ))
        })?
        .as_relation()
        .map(Relation::kind);
    if !matches!(
        morph_kind,
        Some(RelationKind::MorphToOne | RelationKind::MorphToMany)
    ) {
        return Err(MetadataError::inconsistent(format!(
            "'{}.{}' is not a morphToOne or morphToMany relation",
            target_model.uid, morph.morph_by
        )));
    }

    let mut attribute = RelationAttribute::new(kind, Some(morph.target.clone()));
    attribute.morph_by = Some(morph.morph_by.clone());
    ctx.set_attribute(owner, name, ResolvedAttribute::Relation(attribute));
    Ok(())
}

pub(crate) fn add_column(table: &mut TableMetadata, column: ScalarColumn) {
    table
        .attributes
        .insert(column.column_name.clone(), ResolvedAttribute::Scalar(column));
}

/// Unsigned float position column, null until a row is placed
pub(crate) fn order_float(name: &str) -> ScalarColumn {
    ScalarColumn::new(ScalarType::Float, name).unsigned()
}
