//! Canonical tree representation (SoA).
//!
//! For tree construction, see [`super::mutable_tree::MutableTree`].

use ndarray::ArrayView1;

use super::NodeId;

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node was reached by more than one path, or a cycle exists.
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    UnreachableNode { node: NodeId },
}

/// Structure-of-Arrays tree storage with scalar leaves and numeric splits.
///
/// Child indices are local to this tree (0 = root).
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
}

impl Tree {
    /// Create a new tree from parallel arrays of equal length.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f32>,
    ) -> Self {
        let n_nodes = split_indices.len();
        debug_assert_eq!(n_nodes, split_thresholds.len());
        debug_assert_eq!(n_nodes, left_children.len());
        debug_assert_eq!(n_nodes, right_children.len());
        debug_assert_eq!(n_nodes, default_left.len());
        debug_assert_eq!(n_nodes, is_leaf.len());
        debug_assert_eq!(n_nodes, leaf_values.len());

        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.split_indices.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Largest feature index used by any split, if the tree has splits.
    pub fn max_split_index(&self) -> Option<u32> {
        self.split_indices
            .iter()
            .zip(self.is_leaf.iter())
            .filter(|&(_, &leaf)| !leaf)
            .map(|(&idx, _)| idx)
            .max()
    }

    /// Walk from the root to a leaf for one sample.
    ///
    /// Goes left when `value < threshold`; NaN follows the default direction.
    /// The sample must cover every split index (see [`Tree::max_split_index`]).
    #[inline]
    pub fn traverse_to_leaf(&self, sample: ArrayView1<'_, f32>) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let fvalue = sample[self.split_index(node) as usize];
            let go_left = if fvalue.is_nan() {
                self.default_left(node)
            } else {
                fvalue < self.split_threshold(node)
            };
            node = if go_left {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Leaf value reached by `sample`.
    #[inline]
    pub fn predict_row(&self, sample: ArrayView1<'_, f32>) -> f32 {
        self.leaf_value(self.traverse_to_leaf(sample))
    }

    /// Validate that every node is reachable from the root exactly once
    /// and that child pointers are in range.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            let slot = &mut visited[node as usize];
            if *slot {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            *slot = true;
            if self.is_leaf(node) {
                continue;
            }
            for (side, child) in [("left", self.left_child(node)), ("right", self.right_child(node))] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                stack.push(child);
            }
        }

        match visited.iter().position(|v| !v) {
            Some(node) => Err(TreeValidationError::UnreachableNode { node: node as NodeId }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::MutableTree;
    use ndarray::array;

    fn stump(threshold: f32, default_left: bool) -> Tree {
        let mut tree = MutableTree::with_n_nodes(3);
        tree.set_numeric_split(0, 1, threshold, default_left, 1, 2);
        tree.make_leaf(1, -1.0);
        tree.make_leaf(2, 1.0);
        tree.freeze()
    }

    #[test]
    fn numeric_split_goes_left_below_threshold() {
        let tree = stump(0.5, true);
        assert_eq!(tree.predict_row(array![9.0, 0.4].view()), -1.0);
        assert_eq!(tree.predict_row(array![9.0, 0.5].view()), 1.0);
    }

    #[test]
    fn nan_follows_default_direction() {
        assert_eq!(stump(0.5, true).predict_row(array![0.0, f32::NAN].view()), -1.0);
        assert_eq!(stump(0.5, false).predict_row(array![0.0, f32::NAN].view()), 1.0);
    }

    #[test]
    fn max_split_index_ignores_leaves() {
        assert_eq!(stump(0.5, true).max_split_index(), Some(1));
        let mut leaf_only = MutableTree::with_n_nodes(1);
        leaf_only.make_leaf(0, 3.0);
        assert_eq!(leaf_only.freeze().max_split_index(), None);
    }

    #[test]
    fn validate_detects_bad_structure() {
        assert!(stump(0.5, true).validate().is_ok());

        let mut dangling = MutableTree::with_n_nodes(3);
        dangling.set_numeric_split(0, 0, 0.5, true, 1, 7);
        dangling.make_leaf(1, 0.0);
        dangling.make_leaf(2, 0.0);
        assert!(matches!(
            dangling.freeze().validate(),
            Err(TreeValidationError::ChildOutOfBounds { child: 7, .. })
        ));

        let mut orphan = MutableTree::with_n_nodes(2);
        orphan.make_leaf(0, 0.0);
        orphan.make_leaf(1, 0.0);
        assert_eq!(
            orphan.freeze().validate(),
            Err(TreeValidationError::UnreachableNode { node: 1 })
        );
    }
}
