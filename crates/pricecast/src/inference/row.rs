//! Named feature vector passed to the predictor.

use ndarray::{Array1, ArrayView1};

/// Feature values aligned to an ordered list of names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    names: Vec<String>,
    values: Array1<f32>,
}

impl FeatureRow {
    /// All features set to 0.
    pub fn zeros(names: Vec<String>) -> Self {
        let values = Array1::zeros(names.len());
        Self { names, values }
    }

    /// Build from `(name, value)` pairs in order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<f32>) =
            pairs.into_iter().map(|(n, v)| (n.into(), v)).unzip();
        Self {
            names,
            values: Array1::from(values),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Set `name` to `value`. Returns false when the row has no such feature.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.position(name).map(|idx| self.values[idx])
    }

    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    pub fn values(&self) -> ArrayView1<'_, f32> {
        self.values.view()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
