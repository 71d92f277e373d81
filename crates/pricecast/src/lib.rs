//! pricecast: a dynamic prediction form over a CSV schema.
//!
//! Reads a tabular dataset, infers which columns are binary, integer or float
//! and which binary columns form one-hot groups, builds an HTML form from that
//! schema and feeds submissions into a pre-trained XGBoost tree ensemble.
//!
//! # Key Types
//!
//! - [`Table`] - Typed CSV columns
//! - [`Schema`] - Inferred feature kinds and one-hot groups
//! - [`FormSpec`] / [`FormState`] - Form definition and per-request values
//! - [`Predictor`] - Native evaluation of an XGBoost JSON model
//! - [`AppContext`] - Immutable startup state shared by HTTP handlers
//!
//! # Loading XGBoost Models
//!
//! Use [`compat::xgboost::XgbModel`] to parse JSON models and
//! [`Predictor::from_model`] to make them ready for inference.

pub mod app;
pub mod compat;
pub mod config;
pub mod data;
pub mod error;
pub mod form;
pub mod inference;
pub mod logging;
pub mod repr;
pub mod samples;
pub mod schema;
pub mod testing;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use app::AppContext;
pub use config::Config;
pub use data::{Row, Table, TableError, Value};
pub use error::StartupError;
pub use form::{FormSpec, FormState, ValidatedForm, ValidationError};
pub use inference::{
    FeatureMismatchWarning, FeatureRow, ModelLoadError, PredictionError, Predictor,
};
pub use samples::SampleSet;
pub use schema::{ColumnKind, OneHotGroup, Schema, SchemaError};
