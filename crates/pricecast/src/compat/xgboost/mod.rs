//! XGBoost JSON model format support.
//!
//! This module provides parsing of XGBoost's JSON model format and conversion
//! to the native [`Forest`](crate::repr::gbdt::Forest).

mod convert;
mod json;

pub use convert::{prob_to_margin, ConversionError};
pub use json::*;
