//! Metadata registry builder

use super::components::{self, ComponentPivot};
use super::relations::{self, MorphPivot};
use super::resolver::{self, RelationTask, Resolution, TaskKind};
use super::table::{ResolvedAttribute, ScalarColumn, TableMetadata};
use super::Metadata;
use crate::config::MetadataConfig;
use crate::error::{MetadataError, Result};
use crate::identifier::{names, Identifier, IdentifierGenerator};
use crate::model::Model;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Compiles models into [`Metadata`].
///
/// Each call to [`build`](MetadataBuilder::build) starts from a fresh
/// identifier registry, so builds never influence each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataBuilder {
    config: MetadataConfig,
}

impl MetadataBuilder {
    pub fn new(config: MetadataConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetadataConfig {
        &self.config
    }

    /// Compile `models`, in order, into table metadata.
    ///
    /// # Errors
    ///
    /// Any [`MetadataError`] aborts the build; attribute-level failures are
    /// wrapped in [`MetadataError::Attribute`].
    pub fn build(&self, models: &[Model]) -> Result<Metadata> {
        let generator = IdentifierGenerator::new(self.config.max_identifier_length);
        let mut ctx = BuildContext::new(models, generator)?;

        let tasks = ctx.resolve_scalars()?;
        log::debug!("resolved scalar attributes, {} relation task(s) pending", tasks.len());

        for task in &tasks {
            ctx.expand(task)
                .map_err(|e| e.on_attribute(&models[task.owner].uid, &task.attribute))?;
        }

        let metadata = ctx.finish()?;
        log::info!(
            "compiled {} model(s) into {} table(s)",
            models.len(),
            metadata.len()
        );
        Ok(metadata)
    }
}

/// Mutable state of one build
///
/// Models are addressed by their index in the input slice; `tables` holds
/// the metadata being filled for each of them at the same index.
pub(crate) struct BuildContext<'a> {
    pub(crate) models: &'a [Model],
    uids: HashMap<&'a str, usize>,
    pub(crate) tables: Vec<TableMetadata>,
    model_tables: HashSet<String>,
    synthetic: BTreeMap<String, TableMetadata>,
    pub(crate) component_links: HashMap<usize, ComponentPivot>,
    pub(crate) morph_links: HashMap<usize, MorphPivot>,
    generator: IdentifierGenerator,
}

impl<'a> BuildContext<'a> {
    fn new(models: &'a [Model], mut generator: IdentifierGenerator) -> Result<Self> {
        let mut uids = HashMap::with_capacity(models.len());
        let mut model_tables = HashSet::with_capacity(models.len());
        let mut tables = Vec::with_capacity(models.len());

        for (index, model) in models.iter().enumerate() {
            if uids.insert(model.uid.as_str(), index).is_some() {
                return Err(MetadataError::DuplicateModel {
                    uid: model.uid.clone(),
                });
            }

            let table_name = generator.generate(&names::table(&model.table_name))?;
            if !model_tables.insert(table_name.clone()) {
                return Err(MetadataError::DuplicateTable { table: table_name });
            }

            let mut table = TableMetadata::new(&model.uid, &model.singular_name, table_name);
            table.indexes = model.indexes.clone();
            table.foreign_keys = model.foreign_keys.clone();
            table.lifecycles = model.lifecycles.clone();
            tables.push(table);
        }

        Ok(Self {
            models,
            uids,
            tables,
            model_tables,
            synthetic: BTreeMap::new(),
            component_links: HashMap::new(),
            morph_links: HashMap::new(),
            generator,
        })
    }

    /// Phase 1: resolve every scalar column, collect everything else.
    fn resolve_scalars(&mut self) -> Result<Vec<RelationTask>> {
        let models = self.models;
        let mut tasks = Vec::new();

        for (index, model) in models.iter().enumerate() {
            if !model.attributes.contains_key(names::ID_COLUMN) {
                let id = resolver::id_column(&mut self.generator)?;
                self.set_attribute(index, names::ID_COLUMN, ResolvedAttribute::Scalar(id));
            }

            for (name, definition) in &model.attributes {
                let resolution = resolver::resolve(&mut self.generator, index, name, definition)
                    .map_err(|e| e.on_attribute(&model.uid, name))?;
                match resolution {
                    Resolution::Column(column) => {
                        self.set_attribute(index, name, ResolvedAttribute::Scalar(column))
                    }
                    Resolution::Task(task) => tasks.push(task),
                }
            }
        }

        Ok(tasks)
    }

    /// Phase 2: expand one deferred attribute.
    fn expand(&mut self, task: &RelationTask) -> Result<()> {
        match &task.kind {
            TaskKind::Relation(relation) => {
                relations::expand(self, task.owner, &task.attribute, relation)
            }
            TaskKind::Component(component) => {
                components::expand_component(self, task.owner, &task.attribute, component)
            }
            TaskKind::DynamicZone(zone) => {
                components::expand_dynamic_zone(self, task.owner, &task.attribute, zone)
            }
        }
    }

    /// Phase 3: index columns, check uniqueness and merge synthetic tables.
    fn finish(self) -> Result<Metadata> {
        let mut tables = BTreeMap::new();
        let synthetic_count = self.synthetic.len();

        for table in self.tables.into_iter().chain(self.synthetic.into_values()) {
            let table = index_columns(table)?;
            check_constraint_names(&table)?;
            if tables.contains_key(&table.uid) {
                return Err(MetadataError::DuplicateTable { table: table.uid });
            }
            tables.insert(table.uid.clone(), table);
        }

        log::debug!("merged {synthetic_count} synthetic table(s)");
        Ok(Metadata::new(tables))
    }

    pub(crate) fn model_index(&self, uid: &str) -> Result<usize> {
        self.uids
            .get(uid)
            .copied()
            .ok_or_else(|| MetadataError::unknown_target(uid))
    }

    /// Physical table name of the model at `index`
    pub(crate) fn table_name(&self, index: usize) -> String {
        self.tables[index].table_name.clone()
    }

    /// Resolve a logical identifier through this build's registry
    pub(crate) fn name(&mut self, identifier: &Identifier) -> Result<String> {
        self.generator.generate(identifier)
    }

    pub(crate) fn id_column(&mut self) -> Result<ScalarColumn> {
        resolver::id_column(&mut self.generator)
    }

    pub(crate) fn set_attribute(&mut self, index: usize, name: &str, attribute: ResolvedAttribute) {
        self.tables[index]
            .attributes
            .insert(name.to_string(), attribute);
    }

    /// Insert `attribute` unless the counterpart's expansion already filled it in
    pub(crate) fn set_attribute_if_absent(
        &mut self,
        index: usize,
        name: &str,
        attribute: ResolvedAttribute,
    ) {
        self.tables[index]
            .attributes
            .entry(name.to_string())
            .or_insert(attribute);
    }

    pub(crate) fn add_synthetic(&mut self, table: TableMetadata) -> Result<()> {
        if self.model_tables.contains(&table.table_name)
            || self.synthetic.contains_key(&table.table_name)
        {
            return Err(MetadataError::DuplicateTable {
                table: table.table_name,
            });
        }
        log::debug!("registered synthetic table '{}'", table.table_name);
        self.synthetic.insert(table.table_name.clone(), table);
        Ok(())
    }
}

/// Fill `column_to_attribute`, rejecting two attributes on one column.
fn index_columns(mut table: TableMetadata) -> Result<TableMetadata> {
    let mut column_to_attribute: BTreeMap<String, String> = BTreeMap::new();

    for (name, attribute) in &table.attributes {
        let Some(column) = attribute.column_name() else {
            continue;
        };
        if let Some(first) = column_to_attribute.insert(column.to_string(), name.clone()) {
            return Err(MetadataError::DuplicateColumn {
                uid: table.uid.clone(),
                column: column.to_string(),
                first,
                second: name.clone(),
            });
        }
    }

    table.column_to_attribute = column_to_attribute;
    Ok(table)
}

/// Index names, and foreign key names, must each be unique within a table.
fn check_constraint_names(table: &TableMetadata) -> Result<()> {
    let mut indexes = HashSet::new();
    for index in &table.indexes {
        if !indexes.insert(index.name.as_str()) {
            return Err(MetadataError::DuplicateConstraint {
                table: table.table_name.clone(),
                name: index.name.clone(),
            });
        }
    }

    let mut foreign_keys = HashSet::new();
    for fk in &table.foreign_keys {
        if !foreign_keys.insert(fk.name.as_str()) {
            return Err(MetadataError::DuplicateConstraint {
                table: table.table_name.clone(),
                name: fk.name.clone(),
            });
        }
    }

    Ok(())
}
