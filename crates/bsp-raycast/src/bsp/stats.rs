//! Post-build tree statistics.

use std::fmt;

use crate::{BspNode, NodeId, Real};

/// Shape statistics of a built tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStats {
    /// Total number of nodes.
    pub nodes: usize,
    /// Number of leaves.
    pub leaves: usize,
    /// Depth of the deepest leaf (the root has depth 0).
    pub max_depth: usize,
    /// Mean leaf depth.
    pub avg_leaf_depth: Real,
    /// Mean number of triangle references per leaf.
    pub avg_triangles_per_leaf: Real,
    /// Largest number of triangle references in one leaf.
    pub max_triangles_per_leaf: usize,
    /// Times a triangle straddling a split plane was copied into both children.
    pub duplicated_triangles: usize,
    /// Triangles that passed the flag mask and degeneracy checks.
    pub candidate_triangles: usize,
    /// Masked-in triangles dropped as degenerate.
    pub discarded_triangles: usize,
}

impl TreeStats {
    /// Walks the node arena from the root and gathers shape statistics.
    pub(crate) fn collect(nodes: &[BspNode]) -> Self {
        let mut stats = Self {
            nodes: nodes.len(),
            ..Self::default()
        };
        if nodes.is_empty() {
            return stats;
        }

        let mut depth_sum = 0;
        let mut member_sum = 0;
        let mut pending = vec![(NodeId::ROOT, 0usize)];

        while let Some((id, depth)) = pending.pop() {
            let node = &nodes[id.index()];
            match node.children() {
                Some([low, high]) => {
                    pending.push((high, depth + 1));
                    pending.push((low, depth + 1));
                }
                None => {
                    stats.leaves += 1;
                    stats.max_depth = stats.max_depth.max(depth);
                    stats.max_triangles_per_leaf =
                        stats.max_triangles_per_leaf.max(node.members().len());
                    depth_sum += depth;
                    member_sum += node.members().len();
                }
            }
        }

        stats.avg_leaf_depth = depth_sum as Real / stats.leaves as Real;
        stats.avg_triangles_per_leaf = member_sum as Real / stats.leaves as Real;
        stats
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} leaves, depth {} (avg {:.2}), {:.2} triangles/leaf (max {}), {} of {} triangles duplicated",
            self.nodes,
            self.leaves,
            self.max_depth,
            self.avg_leaf_depth,
            self.avg_triangles_per_leaf,
            self.max_triangles_per_leaf,
            self.duplicated_triangles,
            self.candidate_triangles,
        )
    }
}
