//! Dependency ordering and validation of compiled tables
//!
//! This module provides functionality to:
//! - Extract foreign key dependencies from compiled metadata
//! - Topologically sort tables so referenced tables come first
//! - Validate that every foreign key points at a known table

use relmeta::Metadata;
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderingError {
    #[error("circular dependency detected between tables: {}", .0.join(", "))]
    Cycle(Vec<String>),

    #[error("{}", .0.join("\n"))]
    DanglingReferences(Vec<String>),
}

/// Table and the tables its foreign keys reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    /// Tables this table depends on, excluding itself
    pub dependencies: Vec<String>,
}

impl TableInfo {
    pub fn new<I, S>(name: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }
}

/// One [`TableInfo`] per compiled table, keyed by physical table name.
///
/// Self references do not constrain creation order and are dropped.
pub fn tables_from_metadata(metadata: &Metadata) -> Vec<TableInfo> {
    metadata
        .tables()
        .map(|table| {
            let dependencies: BTreeSet<&str> = table
                .foreign_keys
                .iter()
                .map(|fk| fk.referenced_table.as_str())
                .filter(|referenced| *referenced != table.table_name)
                .collect();
            TableInfo::new(&table.table_name, dependencies)
        })
        .collect()
}

/// Topologically sort tables by their dependencies
///
/// Returns tables in order: dependencies first, dependents last. Among
/// tables that are ready at the same time the alphabetically first one
/// goes first, so the order is stable.
pub fn topological_sort(tables: &[TableInfo]) -> Result<Vec<String>, OrderingError> {
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();

    for table in tables {
        in_degree.insert(&table.name, 0);
        dependents.entry(&table.name).or_default();
    }
    for table in tables {
        for dep in &table.dependencies {
            if let Some(list) = dependents.get_mut(dep.as_str()) {
                list.push(&table.name);
                *in_degree.entry(&table.name).or_default() += 1;
            }
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut result = Vec::with_capacity(tables.len());

    while let Some(current) = ready.pop_first() {
        result.push(current.to_string());
        for dependent in dependents.get(current).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if result.len() != in_degree.len() {
        let done: HashSet<&str> = result.iter().map(String::as_str).collect();
        let mut stuck: Vec<String> = in_degree
            .keys()
            .filter(|name| !done.contains(*name))
            .map(|name| name.to_string())
            .collect();
        stuck.sort();
        return Err(OrderingError::Cycle(stuck));
    }

    Ok(result)
}

/// Validate that all foreign key references point to tables that exist
pub fn validate_foreign_key_references(tables: &[TableInfo]) -> Result<(), OrderingError> {
    let table_names: HashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    let mut errors = Vec::new();

    for table in tables {
        for dep in &table.dependencies {
            if !table_names.contains(dep.as_str()) {
                errors.push(format!(
                    "Table '{}' has foreign key reference to '{}' which does not exist",
                    table.name, dep
                ));
            }
        }
    }

    if !errors.is_empty() {
        return Err(OrderingError::DanglingReferences(errors));
    }

    Ok(())
}

/// Creation order for every table in `metadata`
pub fn creation_order(metadata: &Metadata) -> Result<Vec<String>, OrderingError> {
    let tables = tables_from_metadata(metadata);
    validate_foreign_key_references(&tables)?;
    topological_sort(&tables)
}
