//! Column-oriented CSV table.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::{Row, Value};

/// Errors raised while reading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Storage type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    /// Every cell is an integer and none are missing.
    Int,
    /// Every present cell is numeric (or the column is entirely missing).
    Float,
    /// Every cell is a boolean and none are missing.
    Bool,
    /// Anything else.
    Text,
}

impl DType {
    #[inline]
    pub fn is_numeric(self) -> bool {
        !matches!(self, DType::Text)
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(self, DType::Int)
    }

    fn infer(values: &[Value]) -> Self {
        let (mut ints, mut floats, mut bools, mut missing) = (false, false, false, false);
        for value in values {
            match value {
                Value::Int(_) => ints = true,
                Value::Float(_) => floats = true,
                Value::Bool(_) => bools = true,
                Value::Missing => missing = true,
                Value::Text(_) => return DType::Text,
            }
        }

        match (bools, ints || floats) {
            // Booleans mixed with numbers or gaps stay as objects.
            (true, true) => DType::Text,
            (true, false) if missing => DType::Text,
            (true, false) => DType::Bool,
            _ if floats || missing => DType::Float,
            _ if ints => DType::Int,
            // Header-only table.
            _ => DType::Float,
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    dtype: DType,
    values: Vec<Value>,
}

impl Column {
    /// Build a column, inferring its dtype. Integers in a float column are
    /// widened to floats.
    pub fn new(name: impl Into<String>, mut values: Vec<Value>) -> Self {
        let dtype = DType::infer(&values);
        if dtype == DType::Float {
            for value in values.iter_mut() {
                if let Value::Int(i) = *value {
                    *value = Value::Float(i as f64);
                }
            }
        }
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Cell at `row`, or `Missing` when out of range.
    #[inline]
    pub fn get(&self, row: usize) -> &Value {
        static MISSING: Value = Value::Missing;
        self.values.get(row).unwrap_or(&MISSING)
    }
}

/// A dataset held as typed columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Read a CSV file with a header row.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read CSV data with a header row from any reader.
    ///
    /// Columns whose name repeats an earlier header are dropped, keeping the
    /// first occurrence. Short records are padded with missing values.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            if seen.insert(name.to_string()) {
                kept.push((idx, name.to_string()));
            } else {
                tracing::debug!(column = name, "dropping duplicate column");
            }
        }

        let mut cells: Vec<Vec<Value>> = vec![Vec::new(); kept.len()];
        let mut n_rows = 0;
        for record in rdr.records() {
            let record = record?;
            for (slot, (idx, _)) in cells.iter_mut().zip(&kept) {
                slot.push(record.get(*idx).map(Value::parse).unwrap_or_default());
            }
            n_rows += 1;
        }

        let columns = kept
            .into_iter()
            .zip(cells)
            .map(|((_, name), values)| Column::new(name, values))
            .collect();

        Ok(Self { columns, n_rows })
    }

    /// Build a table directly from columns. All columns must have the same length.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let n_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        debug_assert!(columns.iter().all(|c| c.values.len() == n_rows));
        Self { columns, n_rows }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Extract one row restricted to `names`. Unknown names are skipped.
    pub fn row(&self, idx: usize, names: &[String]) -> Row {
        names
            .iter()
            .filter_map(|name| {
                self.column(name)
                    .map(|col| (name.clone(), col.get(idx).clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn infers_dtypes() {
        let t = table("a,b,c,d,e\n1,1.5,x,True,1\n2,2,y,False,\n");
        let dtypes: Vec<_> = t.columns().iter().map(|c| c.dtype()).collect();
        assert_eq!(
            dtypes,
            vec![DType::Int, DType::Float, DType::Text, DType::Bool, DType::Float]
        );
        assert_eq!(t.n_rows(), 2);
    }

    #[test]
    fn booleans_with_gaps_are_text() {
        let t = table("a,b\nTrue,1\n,0\nFalse,1\n");
        let a = t.column("a").unwrap();
        assert_eq!(a.dtype(), DType::Text);
        assert!(!a.dtype().is_numeric());
    }

    #[test]
    fn all_missing_column_is_float() {
        let t = table("a,b\n,1\nNaN,2\n");
        assert_eq!(t.column("a").unwrap().dtype(), DType::Float);
    }

    #[test]
    fn duplicate_columns_keep_first() {
        let t = table("a,b,a\n1,2,3\n");
        let names: Vec<_> = t.column_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(t.column("a").unwrap().get(0), &Value::Int(1));
    }

    #[test]
    fn short_records_are_padded() {
        let t = table("a,b\n1\n");
        assert_eq!(t.column("b").unwrap().get(0), &Value::Missing);
    }

    #[test]
    fn row_extraction_skips_unknown_columns() {
        let t = table("a,b\n1,x\n");
        let row = t.row(0, &["a".into(), "zzz".into()]);
        assert_eq!(row.len(), 1);
        assert_eq!(row["a"], Value::Int(1));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Table::from_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }
}
