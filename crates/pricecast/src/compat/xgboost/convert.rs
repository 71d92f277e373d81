//! Conversion from XGBoost JSON types to the native forest.

use crate::repr::gbdt::{Forest, ForestValidationError, MutableTree, Tree};

use super::json::{GradientBooster, Tree as XgbTree, XgbModel};

/// Error type for XGBoost model conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("unsupported booster type: {0} models are not supported for tree prediction")]
    UnsupportedBooster(&'static str),
    #[error("tree {0} has no nodes")]
    EmptyTree(usize),
    #[error("tree {tree} declares {num_nodes} nodes but its `{field}` array has {len} entries")]
    LengthMismatch {
        tree: usize,
        field: &'static str,
        num_nodes: usize,
        len: usize,
    },
    #[error("invalid node index in tree {tree}: node {node} references child {child} but tree has {num_nodes} nodes")]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },
    #[error("tree {tree} node {node} uses a categorical split, which is not supported")]
    CategoricalSplit { tree: usize, node: usize },
    #[error("converted forest is malformed: {0:?}")]
    InvalidForest(ForestValidationError),
}

/// Convert base_score from probability space to margin space based on objective.
///
/// The JSON stores base_score in the output space of the objective; the forest
/// accumulates margins.
pub fn prob_to_margin(base_score: f32, objective: &str) -> f32 {
    match objective {
        // logit(p) = log(p / (1 - p))
        "binary:logistic" | "reg:logistic" => {
            let p = base_score.clamp(1e-7, 1.0 - 1e-7);
            (p / (1.0 - p)).ln()
        }
        "reg:gamma" | "reg:tweedie" | "count:poisson" | "survival:cox" | "survival:aft" => {
            base_score.max(1e-7).ln()
        }
        _ => base_score,
    }
}

impl XgbModel {
    /// Convert to a native [`Forest`].
    ///
    /// Only gbtree and dart boosters with numeric splits are supported.
    pub fn to_forest(&self) -> Result<Forest, ConversionError> {
        let (model_trees, weight_drop) = match &self.learner.gradient_booster {
            GradientBooster::Gbtree { model } => (model, None),
            GradientBooster::Dart { gbtree, weight_drop } => (&gbtree.model, Some(weight_drop)),
            booster @ GradientBooster::Gblinear { .. } => {
                return Err(ConversionError::UnsupportedBooster(booster.name()))
            }
        };

        let n_groups = self.n_outputs() as u32;
        let margin = prob_to_margin(
            self.learner.learner_model_param.base_score,
            self.objective(),
        );
        let mut forest = Forest::new(n_groups).with_base_score(vec![margin; n_groups as usize]);

        for (tree_idx, xgb_tree) in model_trees.trees.iter().enumerate() {
            let group = model_trees.tree_info.get(tree_idx).copied().unwrap_or(0).max(0) as u32;
            forest.push_tree(convert_tree(xgb_tree, tree_idx)?, group);
        }

        if let Some(weights) = weight_drop {
            if !weights.is_empty() {
                forest = forest.with_tree_weights(weights.clone());
            }
        }

        forest.validate().map_err(ConversionError::InvalidForest)?;
        Ok(forest)
    }
}

fn check_len(
    tree: usize,
    field: &'static str,
    num_nodes: usize,
    len: usize,
) -> Result<(), ConversionError> {
    if len < num_nodes {
        return Err(ConversionError::LengthMismatch {
            tree,
            field,
            num_nodes,
            len,
        });
    }
    Ok(())
}

fn convert_tree(xgb_tree: &XgbTree, tree_idx: usize) -> Result<Tree, ConversionError> {
    let num_nodes = xgb_tree.tree_param.num_nodes.max(0) as usize;
    if num_nodes == 0 {
        return Err(ConversionError::EmptyTree(tree_idx));
    }
    check_len(tree_idx, "left_children", num_nodes, xgb_tree.left_children.len())?;
    check_len(tree_idx, "right_children", num_nodes, xgb_tree.right_children.len())?;
    check_len(tree_idx, "split_indices", num_nodes, xgb_tree.split_indices.len())?;
    check_len(tree_idx, "split_conditions", num_nodes, xgb_tree.split_conditions.len())?;
    check_len(tree_idx, "default_left", num_nodes, xgb_tree.default_left.len())?;

    let mut tree = MutableTree::with_n_nodes(num_nodes);
    for node in 0..num_nodes {
        let left = xgb_tree.left_children[node];
        let right = xgb_tree.right_children[node];

        // Leaves carry their value in split_conditions.
        if left == -1 {
            tree.make_leaf(node as u32, xgb_tree.split_conditions[node]);
            continue;
        }

        if xgb_tree.split_type.get(node).copied().unwrap_or(0) != 0 {
            return Err(ConversionError::CategoricalSplit {
                tree: tree_idx,
                node,
            });
        }
        for child in [left, right] {
            if child < 0 || child as usize >= num_nodes {
                return Err(ConversionError::InvalidNodeIndex {
                    tree: tree_idx,
                    node,
                    child,
                    num_nodes,
                });
            }
        }

        tree.set_numeric_split(
            node as u32,
            xgb_tree.split_indices[node].max(0) as u32,
            xgb_tree.split_conditions[node],
            xgb_tree.default_left[node],
            left as u32,
            right as u32,
        );
    }

    Ok(tree.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use serde_json::{json, Value};

    fn stump() -> Value {
        json!({
            "tree_param": {"num_nodes": "3", "num_feature": "2", "size_leaf_vector": "1"},
            "id": 0,
            "base_weights": [0.0, -0.4, 0.6],
            "left_children": [1, -1, -1],
            "right_children": [2, -1, -1],
            "parents": [2147483647, 0, 0],
            "split_indices": [1, 0, 0],
            "split_conditions": [0.5, -0.4, 0.6],
            "split_type": [0, 0, 0],
            "default_left": [1, 0, 0],
            "categories": [], "categories_nodes": [],
            "categories_segments": [], "categories_sizes": []
        })
    }

    fn model(booster: Value, objective: &str, base_score: &str) -> XgbModel {
        XgbModel::from_value(&json!({
            "version": [2, 0, 3],
            "learner": {
                "feature_names": ["a", "b"],
                "gradient_booster": booster,
                "objective": {"name": objective},
                "learner_model_param": {
                    "base_score": base_score, "num_class": "0", "num_feature": "2"
                }
            }
        }))
        .unwrap()
    }

    fn gbtree(trees: Vec<Value>) -> Value {
        let n = trees.len();
        json!({"name": "gbtree", "model": {
            "trees": trees,
            "tree_info": vec![0; n],
            "gbtree_model_param": {"num_trees": n.to_string()}
        }})
    }

    #[test]
    fn prob_to_margin_by_objective() {
        assert_eq!(prob_to_margin(3.0, "reg:squarederror"), 3.0);
        assert_abs_diff_eq!(prob_to_margin(0.5, "binary:logistic"), 0.0);
        assert_abs_diff_eq!(prob_to_margin(1.0, "count:poisson"), 0.0);
        assert_abs_diff_eq!(prob_to_margin(std::f32::consts::E, "reg:gamma"), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn converts_gbtree_and_predicts() {
        let forest = model(gbtree(vec![stump(), stump()]), "reg:squarederror", "1E0")
            .to_forest()
            .unwrap();
        assert_eq!(forest.n_trees(), 2);
        assert_eq!(forest.required_features(), 2);

        let low = forest.predict_row(array![0.0, 0.1].view());
        assert_eq!(low.len(), 1);
        let high = forest.predict_row(array![0.0, 0.9].view());
        assert_abs_diff_eq!(low[0], 1.0 - 0.8, epsilon = 1e-6);
        assert_abs_diff_eq!(high[0], 1.0 + 1.2, epsilon = 1e-6);

        let missing = forest.predict_row(array![0.0, f32::NAN].view());
        assert_abs_diff_eq!(missing[0], low[0]);
    }

    #[test]
    fn dart_applies_weight_drop() {
        let dart = json!({
            "name": "dart",
            "gbtree": gbtree(vec![stump()]),
            "weight_drop": [0.5]
        });
        let forest = model(dart, "reg:squarederror", "0").to_forest().unwrap();
        assert_abs_diff_eq!(forest.predict_row(array![0.0, 1.0].view())[0], 0.3);
    }

    #[test]
    fn gblinear_is_rejected() {
        let linear = json!({"name": "gblinear", "model": {"weights": [0.1, 0.2, 0.0]}});
        let err = model(linear, "reg:squarederror", "0").to_forest().unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedBooster("gblinear")));
    }

    #[test]
    fn categorical_split_is_rejected() {
        let mut tree = stump();
        tree["split_type"] = json!([1, 0, 0]);
        let err = model(gbtree(vec![tree]), "reg:squarederror", "0")
            .to_forest()
            .unwrap_err();
        assert!(matches!(err, ConversionError::CategoricalSplit { tree: 0, node: 0 }));
    }

    #[test]
    fn bad_child_index_is_rejected() {
        let mut tree = stump();
        tree["right_children"] = json!([9, -1, -1]);
        let err = model(gbtree(vec![tree]), "reg:squarederror", "0")
            .to_forest()
            .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidNodeIndex { child: 9, .. }));
    }

    #[test]
    fn short_arrays_are_rejected() {
        let mut tree = stump();
        tree["split_conditions"] = json!([0.5]);
        let err = model(gbtree(vec![tree]), "reg:squarederror", "0")
            .to_forest()
            .unwrap_err();
        assert!(matches!(
            err,
            ConversionError::LengthMismatch { field: "split_conditions", .. }
        ));
    }
}
