//! Canonical forest representation (collection of trees).

use ndarray::ArrayView1;

use super::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    BaseScoreLenMismatch { n_groups: u32, len: usize },
    TreeGroupOutOfRange { tree_idx: usize, group: u32, n_groups: u32 },
    TreeWeightsLenMismatch { n_trees: usize, len: usize },
    InvalidTree { tree_idx: usize, error: TreeValidationError },
}

/// Forest of decision trees.
///
/// Stores trees with their output group and, for DART models, a per-tree
/// weight applied to the leaf value.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    tree_weights: Option<Vec<f32>>,
    n_groups: u32,
    base_score: Vec<f32>,
}

impl Forest {
    /// Create a new forest with the given number of groups.
    pub fn new(n_groups: u32) -> Self {
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            tree_weights: None,
            n_groups,
            base_score: vec![0.0; n_groups as usize],
        }
    }

    /// Set the base score for all groups.
    pub fn with_base_score(mut self, base_score: Vec<f32>) -> Self {
        debug_assert_eq!(base_score.len(), self.n_groups as usize);
        self.base_score = base_score;
        self
    }

    /// Set per-tree weights (DART). Must be called after all trees are pushed.
    pub fn with_tree_weights(mut self, weights: Vec<f32>) -> Self {
        self.tree_weights = Some(weights);
        self
    }

    /// Add a tree to the forest. Group ranges are checked by [`Forest::validate`].
    pub fn push_tree(&mut self, tree: Tree, group: u32) {
        self.trees.push(tree);
        self.tree_groups.push(group);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Minimum number of features a sample must provide.
    pub fn required_features(&self) -> usize {
        self.trees
            .iter()
            .filter_map(Tree::max_split_index)
            .max()
            .map_or(0, |idx| idx as usize + 1)
    }

    /// Validate structural invariants (trees, group assignments, base score, weights).
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.base_score.len() != self.n_groups as usize {
            return Err(ForestValidationError::BaseScoreLenMismatch {
                n_groups: self.n_groups,
                len: self.base_score.len(),
            });
        }
        if let Some(weights) = &self.tree_weights {
            if weights.len() != self.trees.len() {
                return Err(ForestValidationError::TreeWeightsLenMismatch {
                    n_trees: self.trees.len(),
                    len: weights.len(),
                });
            }
        }
        for (i, &g) in self.tree_groups.iter().enumerate() {
            if g >= self.n_groups {
                return Err(ForestValidationError::TreeGroupOutOfRange {
                    tree_idx: i,
                    group: g,
                    n_groups: self.n_groups,
                });
            }
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;
        }
        Ok(())
    }

    /// Raw margins (one per group) for a single row of features.
    ///
    /// The row must provide at least [`Forest::required_features`] values.
    pub fn predict_row(&self, features: ArrayView1<'_, f32>) -> Vec<f32> {
        let mut output = self.base_score.clone();
        for (idx, (tree, &group)) in self.trees.iter().zip(&self.tree_groups).enumerate() {
            let weight = self
                .tree_weights
                .as_ref()
                .and_then(|w| w.get(idx).copied())
                .unwrap_or(1.0);
            output[group as usize] += weight * tree.predict_row(features);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::MutableTree;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn build_simple_tree(feature: u32, left_val: f32, right_val: f32, threshold: f32) -> Tree {
        let mut tree = MutableTree::with_n_nodes(3);
        tree.set_numeric_split(0, feature, threshold, true, 1, 2);
        tree.make_leaf(1, left_val);
        tree.make_leaf(2, right_val);
        tree.freeze()
    }

    #[test]
    fn forest_single_tree_regression() {
        let mut forest = Forest::new(1);
        forest.push_tree(build_simple_tree(0, 1.0, 2.0, 0.5), 0);

        assert_eq!(forest.predict_row(array![0.3].view()), vec![1.0]);
        assert_eq!(forest.predict_row(array![0.7].view()), vec![2.0]);
    }

    #[test]
    fn forest_sums_trees_and_base_score() {
        let mut forest = Forest::new(1).with_base_score(vec![0.5]);
        forest.push_tree(build_simple_tree(0, 1.0, 2.0, 0.5), 0);
        forest.push_tree(build_simple_tree(2, 0.5, 1.5, 1.0), 0);

        let pred = forest.predict_row(array![0.3, 0.0, 2.0].view());
        assert_abs_diff_eq!(pred[0], 0.5 + 1.0 + 1.5);
        assert_eq!(forest.required_features(), 3);
        assert!(forest.validate().is_ok());
    }

    #[test]
    fn dart_weights_scale_leaves() {
        let mut forest = Forest::new(1);
        forest.push_tree(build_simple_tree(0, 1.0, 2.0, 0.5), 0);
        forest.push_tree(build_simple_tree(0, 1.0, 2.0, 0.5), 0);
        let forest = forest.with_tree_weights(vec![0.5, 0.25]);

        let pred = forest.predict_row(array![0.0].view());
        assert_abs_diff_eq!(pred[0], 0.75);
    }

    #[test]
    fn validate_catches_weight_mismatch() {
        let mut forest = Forest::new(1);
        forest.push_tree(build_simple_tree(0, 1.0, 2.0, 0.5), 0);
        let forest = forest.with_tree_weights(vec![1.0, 1.0]);
        assert_eq!(
            forest.validate(),
            Err(ForestValidationError::TreeWeightsLenMismatch { n_trees: 1, len: 2 })
        );
    }
}
