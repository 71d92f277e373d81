//! Compatibility layers for loading models from other frameworks.
//!
//! Only XGBoost's JSON format is supported. See [`xgboost::XgbModel`].

pub mod xgboost;
