//! Curated sample rows used to prefill the form.

use std::collections::HashMap;

use crate::data::{Row, Table};

/// A named dataset lookup: the first row whose filter columns all equal the
/// given values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub filters: &'static [(&'static str, f64)],
}

/// Samples offered in the picker, in display order.
pub const CURATED_SAMPLES: &[SampleSpec] = &[
    SampleSpec {
        id: "bmw_5",
        label: "BMW 5",
        filters: &[("brand__BMW", 1.0), ("model__5", 1.0)],
    },
    SampleSpec {
        id: "vw_polo",
        label: "Volkswagen Polo",
        filters: &[("brand__Volkswagen", 1.0), ("model__Polo", 1.0)],
    },
    SampleSpec {
        id: "mb_c_class",
        label: "Mercedes-Benz C-Class",
        filters: &[("brand__Mercedes-Benz", 1.0), ("model__C-Class", 1.0)],
    },
    SampleSpec {
        id: "ford_ecosport",
        label: "Ford Ecosport",
        filters: &[("brand__Ford", 1.0), ("model__Ecosport", 1.0)],
    },
];

/// Entry shown in the sample picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOption {
    pub id: String,
    pub label: String,
}

/// Samples found in the dataset.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    options: Vec<SampleOption>,
    rows: HashMap<String, Row>,
}

impl SampleSet {
    /// Look up each sample in `table`. Rows are restricted to `feature_columns`.
    ///
    /// A sample is skipped when one of its filter columns is absent or when no
    /// row matches.
    pub fn load(table: &Table, specs: &[SampleSpec], feature_columns: &[String]) -> Self {
        let mut set = Self::default();
        for spec in specs {
            match find_row(table, spec) {
                Some(idx) => {
                    set.options.push(SampleOption {
                        id: spec.id.to_string(),
                        label: spec.label.to_string(),
                    });
                    set.rows
                        .insert(spec.id.to_string(), table.row(idx, feature_columns));
                }
                None => tracing::debug!(sample = spec.id, "sample not found in dataset"),
            }
        }
        tracing::info!(n_samples = set.options.len(), "loaded samples");
        set
    }

    pub fn options(&self) -> &[SampleOption] {
        &self.options
    }

    pub fn get(&self, id: &str) -> Option<&Row> {
        self.rows.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

fn find_row(table: &Table, spec: &SampleSpec) -> Option<usize> {
    let columns = spec
        .filters
        .iter()
        .map(|(name, value)| table.column(name).map(|col| (col, *value)))
        .collect::<Option<Vec<_>>>()?;

    (0..table.n_rows()).find(|&row| {
        columns
            .iter()
            .all(|(col, value)| col.get(row).equals_number(*value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    const CSV: &str = "\
brand__BMW,brand__Ford,model__5,model__Ecosport,km,selling_price
0,1,0,1,20000,500000
1,0,0,0,15000,900000
1,0,1,0,30000,4500000
1,0,1,0,10000,5000000
";

    fn load() -> SampleSet {
        let table = Table::from_reader(CSV.as_bytes()).unwrap();
        let features: Vec<String> = ["brand__BMW", "model__5", "km"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        SampleSet::load(&table, CURATED_SAMPLES, &features)
    }

    #[test]
    fn picks_first_matching_row_in_curated_order() {
        let samples = load();
        let ids: Vec<_> = samples.options().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["bmw_5", "ford_ecosport"]);

        let bmw = samples.get("bmw_5").unwrap();
        assert_eq!(bmw["km"], Value::Int(30000));
        assert!(!bmw.contains_key("selling_price"));
        assert!(!bmw.contains_key("brand__Ford"));
    }

    #[test]
    fn absent_filter_columns_skip_the_sample() {
        let samples = load();
        assert!(!samples.contains("vw_polo"));
        assert!(!samples.contains("mb_c_class"));
        assert_eq!(samples.get("mb_c_class"), None);
    }

    #[test]
    fn unmatched_filters_skip_the_sample() {
        let table = Table::from_reader("brand__BMW,model__5\n1,0\n0,1\n".as_bytes()).unwrap();
        let samples = SampleSet::load(&table, CURATED_SAMPLES, &[]);
        assert!(samples.is_empty());
    }
}
