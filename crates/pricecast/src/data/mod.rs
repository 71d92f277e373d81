//! Tabular dataset loading.
//!
//! A [`Table`] holds the CSV as typed columns. Each cell is parsed into a
//! [`Value`] and each column gets a [`DType`] inferred from its cells, the
//! same way a dataframe library would assign dtypes on read.

mod table;
mod value;

use std::collections::HashMap;

pub use table::{Column, DType, Table, TableError};
pub use value::Value;

/// A single dataset row keyed by column name.
pub type Row = HashMap<String, Value>;
