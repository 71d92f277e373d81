//! XGBoost JSON model loader.
//!
//! Parses the JSON written by `Booster.save_model("model.json")`. These are
//! "foreign types" used only for parsing; [`XgbModel::to_forest`] converts
//! them to native types. Fields the predictor does not need are ignored.

use std::io::Read;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

// =============================================================================
// Custom deserializers for XGBoost-specific formats
// =============================================================================

/// Accepts `0.5`, `"0.5"`, `[0.5]`, `"[5E-1]"` and `"[0.5]"`.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let mut cur = Value::deserialize(deserializer)?;
    loop {
        cur = match cur {
            Value::Number(n) => {
                return n
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SerdeError::custom("invalid number"));
            }
            Value::String(s) => {
                let t = s.trim();
                if let Ok(f) = t.parse::<f32>() {
                    return Ok(f);
                }
                if let Some(inner) = t.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                    if let Ok(f) = inner.trim().parse::<f32>() {
                        return Ok(f);
                    }
                }
                match serde_json::from_str::<Value>(t) {
                    Ok(Value::Array(arr)) => Value::Array(arr),
                    _ => {
                        return Err(SerdeError::custom(format!(
                            "cannot parse base_score from string: {s}"
                        )))
                    }
                }
            }
            Value::Array(arr) => match arr.into_iter().next() {
                Some(first) => first,
                None => return Err(SerdeError::custom("empty base_score array")),
            },
            _ => {
                return Err(SerdeError::custom(
                    "base_score must be number, string, or array",
                ))
            }
        };
    }
}

fn parse_flag<E: serde::de::Error>(value: &Value) -> Result<bool, E> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => n
            .as_f64()
            .map(|f| f != 0.0)
            .ok_or_else(|| E::custom("invalid number for bool")),
        Value::String(s) => match s.trim() {
            t if t.eq_ignore_ascii_case("true") || t == "1" => Ok(true),
            t if t.eq_ignore_ascii_case("false") || t == "0" => Ok(false),
            _ => Err(E::custom(format!("cannot parse bool from string: {s}"))),
        },
        _ => Err(E::custom("unsupported type for bool")),
    }
}

/// `default_left` is written as integers by older releases and booleans by newer ones.
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .iter()
        .map(parse_flag::<D::Error>)
        .collect()
}

fn default_num_class() -> i64 {
    0
}
fn default_num_target() -> i64 {
    1
}

// =============================================================================
// Tree / model level definitions
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct TreeParam {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub num_nodes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i32>,
    pub split_conditions: Vec<f32>,
    #[serde(deserialize_with = "deserialize_flags")]
    pub default_left: Vec<bool>,
    #[serde(default)]
    pub split_type: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTrees {
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub tree_info: Vec<i32>,
}

// =============================================================================
// Gradient booster variants (gbtree | gblinear | dart)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GBTreeDefinition {
    pub model: ModelTrees,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree {
        model: ModelTrees,
    },
    /// Parsed only so it can be rejected with a clear error.
    Gblinear {
        model: Value,
    },
    Dart {
        gbtree: GBTreeDefinition,
        #[serde(default)]
        weight_drop: Vec<f32>,
    },
}

impl GradientBooster {
    pub fn name(&self) -> &'static str {
        match self {
            GradientBooster::Gbtree { .. } => "gbtree",
            GradientBooster::Gblinear { .. } => "gblinear",
            GradientBooster::Dart { .. } => "dart",
        }
    }
}

// =============================================================================
// Objective / learner-level definitions
// =============================================================================

/// Training objective. Only the name matters for inference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Objective {
    pub name: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: f32,
    #[serde(rename = "num_class", default = "default_num_class")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub n_class: i64,
    #[serde(rename = "num_feature", default)]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub n_features: i64,
    #[serde(default = "default_num_target")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub num_target: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub objective: Objective,
    pub learner_model_param: LearnerModelParam,
}

// =============================================================================
// Top-level XGBoost model
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct XgbModel {
    pub learner: Learner,
}

impl XgbModel {
    /// Parse a model from JSON text read from `reader`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Parse a model from a serde_json Value.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Declared feature names, or `None` when the model was trained without names.
    pub fn feature_names(&self) -> Option<&[String]> {
        let names = &self.learner.feature_names;
        (!names.is_empty()).then_some(names.as_slice())
    }

    /// Declared feature count, or `None` when the model does not record one.
    pub fn n_features(&self) -> Option<usize> {
        let n = self.learner.learner_model_param.n_features;
        (n > 0).then_some(n as usize)
    }

    /// Number of outputs per row (1 for regression and binary classification).
    pub fn n_outputs(&self) -> usize {
        let param = &self.learner.learner_model_param;
        param.n_class.max(param.num_target).max(1) as usize
    }

    pub fn objective(&self) -> &str {
        &self.learner.objective.name
    }
}

// =============================================================================
// Tests
// =============================================================================
