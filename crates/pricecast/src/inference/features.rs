//! Resolution of the feature order the model consumes.

/// The model declares a feature count that disagrees with the dataset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Model expects {expected} features, but CSV has {actual}.")]
pub struct FeatureMismatchWarning {
    pub expected: usize,
    pub actual: usize,
}

/// Feature order used to build model inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureOrder {
    pub names: Vec<String>,
    pub mismatch: Option<FeatureMismatchWarning>,
}

impl FeatureOrder {
    /// Whether the schema must be narrowed to these names.
    pub fn narrows(&self, schema_columns: &[String]) -> bool {
        !self.names.is_empty() && self.names.len() < schema_columns.len()
    }
}

/// Decide which features, in which order, the model is fed.
///
/// Declared names win. Without names, a declared count takes that many schema
/// columns from the front and flags a mismatch when the counts differ. With
/// neither, the schema columns are used as is.
pub fn resolve_feature_order(
    model_names: Option<&[String]>,
    model_count: Option<usize>,
    schema_columns: &[String],
) -> FeatureOrder {
    if let Some(names) = model_names {
        return FeatureOrder {
            names: names.to_vec(),
            mismatch: None,
        };
    }

    if let Some(expected) = model_count {
        let actual = schema_columns.len();
        let names = schema_columns.iter().take(expected).cloned().collect();
        let mismatch = (expected != actual).then_some(FeatureMismatchWarning { expected, actual });
        return FeatureOrder { names, mismatch };
    }

    FeatureOrder {
        names: schema_columns.to_vec(),
        mismatch: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn declared_names_win_without_warning() {
        let schema = cols(&["brand_BMW", "brand_Audi", "transmission_type"]);
        let model = cols(&["brand_BMW", "transmission_type"]);
        let order = resolve_feature_order(Some(model.as_slice()), Some(5), &schema);

        assert_eq!(order.names, model);
        assert_eq!(order.mismatch, None);
        assert!(order.narrows(&schema));
    }

    #[test]
    fn declared_count_takes_prefix_and_warns() {
        let schema = cols(&["a", "b", "c"]);
        let order = resolve_feature_order(None, Some(2), &schema);

        assert_eq!(order.names, cols(&["a", "b"]));
        let warning = order.mismatch.clone().unwrap();
        assert_eq!(warning.to_string(), "Model expects 2 features, but CSV has 3.");
        assert!(order.narrows(&schema));
    }

    #[test]
    fn larger_count_keeps_all_columns() {
        let schema = cols(&["a", "b"]);
        let order = resolve_feature_order(None, Some(4), &schema);
        assert_eq!(order.names, schema);
        assert_eq!(
            order.mismatch,
            Some(FeatureMismatchWarning { expected: 4, actual: 2 })
        );
        assert!(!order.narrows(&schema));
    }

    #[test]
    fn nothing_declared_uses_schema() {
        let schema = cols(&["a", "b"]);
        let order = resolve_feature_order(None, None, &schema);
        assert_eq!(order.names, schema);
        assert_eq!(order.mismatch, None);
    }
}
