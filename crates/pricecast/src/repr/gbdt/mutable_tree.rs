//! Mutable tree used while converting foreign models.

use super::{NodeId, Tree};

/// Tree under construction with a fixed node count.
///
/// Nodes start as zero-valued leaves. Call [`MutableTree::freeze`] to get an
/// immutable [`Tree`].
#[derive(Debug, Clone, Default)]
pub struct MutableTree {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
}

impl MutableTree {
    /// Allocate `n_nodes` leaf nodes.
    pub fn with_n_nodes(n_nodes: usize) -> Self {
        Self {
            split_indices: vec![0; n_nodes],
            split_thresholds: vec![0.0; n_nodes],
            left_children: vec![0; n_nodes],
            right_children: vec![0; n_nodes],
            default_left: vec![false; n_nodes],
            is_leaf: vec![true; n_nodes],
            leaf_values: vec![0.0; n_nodes],
        }
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn make_leaf(&mut self, node: NodeId, value: f32) {
        let i = node as usize;
        self.is_leaf[i] = true;
        self.leaf_values[i] = value;
    }

    pub fn set_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
        left: NodeId,
        right: NodeId,
    ) {
        let i = node as usize;
        self.is_leaf[i] = false;
        self.split_indices[i] = feature;
        self.split_thresholds[i] = threshold;
        self.default_left[i] = default_left;
        self.left_children[i] = left;
        self.right_children[i] = right;
    }

    pub fn freeze(self) -> Tree {
        Tree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.default_left,
            self.is_leaf,
            self.leaf_values,
        )
    }
}
