//! Inference gateway.
//!
//! Wraps the native forest behind a name-checked, single-row API and decides
//! the feature order the rest of the application builds rows in.

mod features;
mod predictor;
mod row;
mod transform;

pub use features::{resolve_feature_order, FeatureMismatchWarning, FeatureOrder};
pub use predictor::{ModelLoadError, PredictionError, Predictor};
pub use row::FeatureRow;
pub use transform::OutputTransform;
