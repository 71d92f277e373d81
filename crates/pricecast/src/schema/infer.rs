//! Column classification and one-hot group detection.

use std::collections::HashSet;

use crate::data::{Column, Table};

use super::{ColumnKind, FeatureColumn, OneHotGroup, Schema, SchemaError, GROUP_NAMES};

/// True when `column` is numeric and its present values are a non-empty
/// subset of {0, 1}.
pub fn is_one_hot(column: &Column) -> bool {
    if !column.dtype().is_numeric() {
        return false;
    }
    let mut any = false;
    for value in column.values() {
        match value.as_f64() {
            None => continue,
            Some(x) if x == 0.0 || x == 1.0 => any = true,
            Some(_) => return false,
        }
    }
    any
}

pub(super) fn infer_schema(table: &Table, target: &str) -> Result<Schema, SchemaError> {
    if table.column(target).is_none() {
        return Err(SchemaError::MissingTarget(target.to_string()));
    }

    let features: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| c.name() != target)
        .collect();
    let candidates: HashSet<&str> = features
        .iter()
        .filter(|c| is_one_hot(c))
        .map(|c| c.name())
        .collect();

    let mut grouped: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();
    for &name in GROUP_NAMES {
        let prefix = format!("{name}_");
        let members: Vec<String> = features
            .iter()
            .map(|c| c.name())
            .filter(|c| candidates.contains(c) && !grouped.contains(c) && c.starts_with(&prefix))
            .map(str::to_string)
            .collect();
        if members.is_empty() {
            continue;
        }
        grouped.extend(
            features
                .iter()
                .map(|c| c.name())
                .filter(|c| members.iter().any(|m| m == c)),
        );
        groups.push(OneHotGroup::new(name, members));
    }

    let ungrouped = features
        .iter()
        .filter(|c| !grouped.contains(c.name()))
        .map(|c| FeatureColumn::new(c.name(), classify(c, &candidates)))
        .collect();

    let feature_columns = features.iter().map(|c| c.name().to_string()).collect();

    tracing::debug!(
        n_groups = groups.len(),
        n_grouped = grouped.len(),
        "inferred schema"
    );

    Ok(Schema::from_parts(feature_columns, ungrouped, groups))
}

fn classify(column: &Column, candidates: &HashSet<&str>) -> ColumnKind {
    if candidates.contains(column.name()) {
        ColumnKind::Binary
    } else if column.dtype().is_integer() {
        ColumnKind::Int
    } else {
        ColumnKind::Float
    }
}
