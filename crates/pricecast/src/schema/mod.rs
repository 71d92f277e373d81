//! Feature schema inferred from a dataset.
//!
//! The schema splits every non-target column into exactly one of:
//! - an ungrouped [`FeatureColumn`] with a [`ColumnKind`], or
//! - a member of a [`OneHotGroup`] (dummy-encoded categorical such as `brand`).

mod infer;

use std::collections::HashSet;
use std::fmt;

use crate::data::{Table, TableError};

pub use infer::is_one_hot;

/// Name of the prediction target column.
pub const TARGET_COLUMN: &str = "selling_price";

/// Group names recognized as one-hot prefixes, in detection order.
pub const GROUP_NAMES: &[&str] = &["brand", "model", "seller_type", "fuel_type", "transmission_type"];

/// Errors raised while inferring a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("Expected {0} column in CSV.")]
    MissingTarget(String),
}

/// Kind of an ungrouped feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Only 0/1 values.
    Binary,
    /// Integer dtype.
    Int,
    /// Anything else.
    Float,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Binary => f.write_str("binary"),
            ColumnKind::Int => f.write_str("int"),
            ColumnKind::Float => f.write_str("float"),
        }
    }
}

/// A feature column that is not part of any one-hot group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: ColumnKind,
}

impl FeatureColumn {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Binary columns that jointly encode one categorical choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotGroup {
    /// Group name, e.g. `brand`.
    pub name: String,
    /// Form field carrying the selection, e.g. `brand_choice`.
    pub field_name: String,
    /// Column prefix shared by all members, e.g. `brand_`.
    pub prefix: String,
    /// Member columns, sorted by name.
    pub columns: Vec<String>,
}

impl OneHotGroup {
    pub fn new(name: impl Into<String>, mut columns: Vec<String>) -> Self {
        let name = name.into();
        columns.sort();
        Self {
            field_name: format!("{name}_choice"),
            prefix: format!("{name}_"),
            name,
            columns,
        }
    }

    #[inline]
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Member name with the group prefix (and any extra separator) removed.
    pub fn member_suffix<'a>(&self, column: &'a str) -> &'a str {
        column
            .strip_prefix(self.prefix.as_str())
            .unwrap_or(column)
            .trim_start_matches('_')
    }
}

/// Inferred dataset schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    feature_columns: Vec<String>,
    ungrouped: Vec<FeatureColumn>,
    groups: Vec<OneHotGroup>,
}

impl Schema {
    /// Infer the schema of `table` using [`TARGET_COLUMN`] as the target.
    pub fn infer(table: &Table) -> Result<Self, SchemaError> {
        infer::infer_schema(table, TARGET_COLUMN)
    }

    /// Assemble a schema from parts.
    ///
    /// `feature_columns` must list every ungrouped and grouped column exactly once.
    pub fn from_parts(
        feature_columns: Vec<String>,
        ungrouped: Vec<FeatureColumn>,
        groups: Vec<OneHotGroup>,
    ) -> Self {
        let schema = Self {
            feature_columns,
            ungrouped,
            groups,
        };
        debug_assert!(schema.is_partition(), "schema parts must partition the feature columns");
        schema
    }

    /// All feature columns in dataset order.
    #[inline]
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.feature_columns.len()
    }

    /// Feature columns outside every group, in dataset order.
    #[inline]
    pub fn ungrouped(&self) -> &[FeatureColumn] {
        &self.ungrouped
    }

    #[inline]
    pub fn groups(&self) -> &[OneHotGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&OneHotGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        self.ungrouped
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.kind)
    }

    /// Restrict the schema to the `allowed` columns.
    ///
    /// Groups left without members are dropped. Order is preserved.
    pub fn narrow_to(&self, allowed: &[String]) -> Self {
        let allowed: HashSet<&str> = allowed.iter().map(String::as_str).collect();
        let keep = |name: &String| allowed.contains(name.as_str());

        let groups = self
            .groups
            .iter()
            .filter_map(|group| {
                let columns: Vec<String> = group.columns.iter().filter(|c| keep(c)).cloned().collect();
                (!columns.is_empty()).then(|| OneHotGroup {
                    columns,
                    ..group.clone()
                })
            })
            .collect();

        Self {
            feature_columns: self.feature_columns.iter().filter(|c| keep(c)).cloned().collect(),
            ungrouped: self.ungrouped.iter().filter(|c| keep(&c.name)).cloned().collect(),
            groups,
        }
    }

    /// True when grouped and ungrouped columns are disjoint and together cover
    /// every feature column exactly once.
    pub fn is_partition(&self) -> bool {
        let mut seen = HashSet::new();
        let members = self
            .ungrouped
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.groups.iter().flat_map(|g| g.columns.iter().map(String::as_str)));
        for name in members {
            if !seen.insert(name) {
                return false;
            }
        }
        seen.len() == self.feature_columns.len()
            && self.feature_columns.iter().all(|c| seen.contains(c.as_str()))
    }
}
