//! Model loading and single-row prediction.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::compat::xgboost::{ConversionError, XgbModel};
use crate::repr::gbdt::Forest;

use super::{FeatureRow, OutputTransform};

/// Errors raised while loading a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("model has {0} outputs; only single-output models are supported")]
    MultiOutput(usize),
}

/// Errors raised for a single prediction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("feature names mismatch: expected {expected:?}, got {got:?}")]
    FeatureNames {
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("feature shape mismatch, expected: {expected}, got {got}")]
    FeatureCount { expected: usize, got: usize },
    #[error("model produced a non-finite value ({0})")]
    NonFinite(f64),
}

/// A loaded model ready for inference.
#[derive(Debug, Clone)]
pub struct Predictor {
    forest: Forest,
    transform: OutputTransform,
    feature_names: Option<Vec<String>>,
    n_features: Option<usize>,
}

impl Predictor {
    /// Load an XGBoost JSON model from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = XgbModel::from_reader(BufReader::new(file))?;
        let predictor = Self::from_model(&model)?;
        tracing::info!(
            path = %path.display(),
            objective = model.objective(),
            n_trees = predictor.forest.n_trees(),
            "loaded model"
        );
        Ok(predictor)
    }

    pub fn from_model(model: &XgbModel) -> Result<Self, ModelLoadError> {
        let n_outputs = model.n_outputs();
        if n_outputs != 1 {
            return Err(ModelLoadError::MultiOutput(n_outputs));
        }
        Ok(Self {
            forest: model.to_forest()?,
            transform: OutputTransform::from_objective(model.objective()),
            feature_names: model.feature_names().map(<[String]>::to_vec),
            n_features: model.n_features(),
        })
    }

    /// Feature names recorded in the model, if any.
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Feature count recorded in the model, if any.
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    pub fn transform(&self) -> OutputTransform {
        self.transform
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Predict one row. The row must follow the model's feature order.
    pub fn predict(&self, row: &FeatureRow) -> Result<f64, PredictionError> {
        if let Some(expected) = &self.feature_names {
            if expected.as_slice() != row.names() {
                return Err(PredictionError::FeatureNames {
                    expected: expected.clone(),
                    got: row.names().to_vec(),
                });
            }
        }

        let expected = self
            .n_features
            .unwrap_or(row.len())
            .max(self.forest.required_features());
        if row.len() != expected {
            return Err(PredictionError::FeatureCount {
                expected,
                got: row.len(),
            });
        }

        let margin = self.forest.predict_row(row.values())[0] as f64;
        let value = self.transform.apply(margin);
        if !value.is_finite() {
            return Err(PredictionError::NonFinite(value));
        }
        tracing::debug!(margin, value, "prediction");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use serde_json::{json, Value};

    fn model_json(names: Option<Vec<&str>>, num_feature: &str, objective: &str) -> Value {
        let mut learner = json!({
            "gradient_booster": {"name": "gbtree", "model": {
                "trees": [{
                    "tree_param": {"num_nodes": "3", "num_feature": num_feature},
                    "left_children": [1, -1, -1],
                    "right_children": [2, -1, -1],
                    "split_indices": [0, 0, 0],
                    "split_conditions": [10.0, 1.0, 3.0],
                    "default_left": [0, 0, 0]
                }],
                "tree_info": [0],
                "gbtree_model_param": {"num_trees": "1"}
            }},
            "objective": {"name": objective},
            "learner_model_param": {"base_score": "1E0", "num_class": "0", "num_feature": num_feature}
        });
        if let Some(names) = names {
            learner["feature_names"] = json!(names);
        }
        json!({"version": [2, 0, 3], "learner": learner})
    }

    fn predictor(value: Value) -> Predictor {
        Predictor::from_model(&XgbModel::from_value(&value).unwrap()).unwrap()
    }

    #[test]
    fn predicts_with_declared_names() {
        let p = predictor(model_json(Some(vec!["x", "y"]), "2", "reg:squarederror"));
        let row = FeatureRow::from_pairs([("x", 20.0), ("y", 0.0)]);
        assert_abs_diff_eq!(p.predict(&row).unwrap(), 4.0);
        assert_eq!(p.feature_names(), Some(&["x".to_string(), "y".to_string()][..]));
    }

    #[test]
    fn rejects_wrong_names_and_counts() {
        let named = predictor(model_json(Some(vec!["x", "y"]), "2", "reg:squarederror"));
        let swapped = FeatureRow::from_pairs([("y", 0.0), ("x", 20.0)]);
        assert!(matches!(
            named.predict(&swapped),
            Err(PredictionError::FeatureNames { .. })
        ));

        let unnamed = predictor(model_json(None, "3", "reg:squarederror"));
        let short = FeatureRow::from_pairs([("a", 0.0), ("b", 0.0)]);
        assert_eq!(
            unnamed.predict(&short),
            Err(PredictionError::FeatureCount { expected: 3, got: 2 })
        );
    }

    #[test]
    fn applies_output_transform() {
        let p = predictor(model_json(None, "1", "count:poisson"));
        // base_score 1 -> margin 0; leaf 1.0 -> exp(1).
        let row = FeatureRow::from_pairs([("a", 0.0)]);
        assert_abs_diff_eq!(p.predict(&row).unwrap(), std::f64::consts::E, epsilon = 1e-6);
    }

    #[test]
    fn multi_output_is_rejected() {
        let mut value = model_json(None, "1", "multi:softprob");
        value["learner"]["learner_model_param"]["num_class"] = json!("3");
        let model = XgbModel::from_value(&value).unwrap();
        assert!(matches!(
            Predictor::from_model(&model),
            Err(ModelLoadError::MultiOutput(3))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Predictor::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ModelLoadError::Io { .. }));
    }
}
