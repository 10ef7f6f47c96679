//! Recursive subdivision of the scene box into BSP nodes.

use std::mem::size_of;

use log::{trace, warn};

use crate::{Aabb, BspError, BspNode, BuildConfig, NodeId, Result, TriangleBoundsCache};

/// Builds the node arena for one tree.
///
/// Nodes are appended to the arena in creation order, so the root is always
/// [`NodeId::ROOT`] and both children of a node are allocated together.
pub(crate) struct TreeBuilder<'a> {
    config: &'a BuildConfig,
    cache: &'a TriangleBoundsCache,
    nodes: Vec<BspNode>,
    duplicated: usize,
}

/// Output of a successful build.
pub(crate) struct BuiltNodes {
    pub(crate) nodes: Vec<BspNode>,
    pub(crate) duplicated: usize,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(config: &'a BuildConfig, cache: &'a TriangleBoundsCache) -> Self {
        Self {
            config,
            cache,
            nodes: Vec::new(),
            duplicated: 0,
        }
    }

    /// Subdivides `bounds` until every leaf satisfies a stopping condition.
    ///
    /// On error the partially built arena is dropped.
    pub(crate) fn build(mut self, bounds: Aabb) -> Result<BuiltNodes> {
        let root = self.alloc(BspNode::new(bounds, 0));
        debug_assert_eq!(root, NodeId::ROOT);

        let members: Vec<u32> = self.cache.slots().collect();
        self.subdivide(root, members, 0)?;

        Ok(BuiltNodes {
            nodes: self.nodes,
            duplicated: self.duplicated,
        })
    }

    fn alloc(&mut self, node: BspNode) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Makes `node` a leaf holding `members`, or splits it and recurses.
    ///
    /// `members` are bounds-cache slots.
    fn subdivide(&mut self, node: NodeId, members: Vec<u32>, depth: usize) -> Result<()> {
        if members.len() <= self.config.max_leaf_size || depth >= self.config.max_depth {
            let triangles = members.iter().map(|&slot| self.cache.triangle(slot)).collect();
            self.nodes[node.index()].set_members(triangles);
            return Ok(());
        }

        let needed = (self.nodes.len() + 2) * size_of::<BspNode>();
        if needed > self.config.node_memory_budget {
            warn!(
                "aborting tree build: {} nodes would need {needed} bytes, budget is {}",
                self.nodes.len() + 2,
                self.config.node_memory_budget
            );
            return Err(BspError::NodeBudgetExceeded {
                nodes: self.nodes.len() + 2,
                budget: self.config.node_memory_budget,
            });
        }

        let bounds = *self.nodes[node.index()].bounds();
        let axis = bounds.largest_axis();
        let split = bounds.min[axis] + self.config.split_fraction * (bounds.max[axis] - bounds.min[axis]);
        let (low_bounds, high_bounds) = bounds.split(axis, split);

        let mut low_members = Vec::new();
        let mut high_members = Vec::new();
        for &slot in &members {
            let tri_bounds = self.cache.bounds(slot);
            let in_low = tri_bounds.overlaps_on_axis(&low_bounds, axis);
            let in_high = tri_bounds.overlaps_on_axis(&high_bounds, axis);
            if in_low {
                low_members.push(slot);
            }
            if in_high {
                high_members.push(slot);
            }
            if in_low && in_high {
                self.duplicated += 1;
            }
        }
        drop(members);

        trace!(
            "node {} depth {depth}: split axis {axis} at {split}, {} low / {} high",
            node.index(),
            low_members.len(),
            high_members.len()
        );

        let next_axis = (axis + 1) % 3;
        let low = self.alloc(BspNode::new(low_bounds, next_axis));
        let high = self.alloc(BspNode::new(high_bounds, next_axis));
        self.nodes[node.index()].set_split(axis, split, [low, high]);

        self.subdivide(low, low_members, depth + 1)?;
        self.subdivide(high, high_members, depth + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MeshRef, Real, Triangle, TriangleFlags};
    use nalgebra::{Point3, Vector3};

    /// Two small triangles far apart on x plus one spanning the middle.
    fn make_mesh_data() -> (Vec<Point3<Real>>, Vec<Vector3<Real>>, Vec<Triangle>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.0, 0.5, 0.0),
            Point3::new(9.5, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 0.5, 0.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(8.0, 0.0, 1.0),
            Point3::new(5.0, 0.5, 1.0),
        ];
        let normals = vec![Vector3::z(); vertices.len()];
        let triangles = vec![
            Triangle::new([0, 1, 2], TriangleFlags::GEOMETRY),
            Triangle::new([3, 4, 5], TriangleFlags::GEOMETRY),
            Triangle::new([6, 7, 8], TriangleFlags::GEOMETRY),
        ];
        (vertices, normals, triangles)
    }

    fn build_nodes(config: &BuildConfig) -> Result<BuiltNodes> {
        let (vertices, normals, triangles) = make_mesh_data();
        let mesh = MeshRef::new(&vertices, &normals, &triangles)?;
        let cache = TriangleBoundsCache::new(&mesh, config.flag_mask);
        let bounds = cache.scene_bounds().unwrap();
        TreeBuilder::new(config, &cache).build(bounds)
    }

    #[test]
    fn splits_largest_axis_and_duplicates_straddlers() {
        let config = BuildConfig::new(1, 1);
        let built = build_nodes(&config).unwrap();

        // Root plus two leaves
        assert_eq!(built.nodes.len(), 3);
        let root = &built.nodes[0];
        assert_eq!(root.axis(), 0);
        let split = root.split().unwrap();
        assert!((split - 0.499999 * 10.0).abs() < 1e-4);

        let low = &built.nodes[root.low().unwrap().index()];
        let high = &built.nodes[root.high().unwrap().index()];
        assert_eq!(low.members(), &[0, 2]);
        assert_eq!(high.members(), &[1, 2]);
        assert_eq!(built.duplicated, 1);

        // Children get the next axis as a hint
        assert_eq!(low.axis(), 1);
    }

    #[test]
    fn leaf_size_stops_subdivision() {
        let config = BuildConfig::new(10, 3);
        let built = build_nodes(&config).unwrap();
        assert_eq!(built.nodes.len(), 1);
        assert_eq!(built.nodes[0].members(), &[0, 1, 2]);
    }

    #[test]
    fn depth_limit_stops_subdivision() {
        let config = BuildConfig::new(0, 0);
        let built = build_nodes(&config).unwrap();
        assert_eq!(built.nodes.len(), 1);
        assert!(built.nodes[0].is_leaf());
    }

    #[test]
    fn budget_aborts_build() {
        let budget = 2 * size_of::<BspNode>();
        let config = BuildConfig::new(10, 0).with_node_memory_budget(budget);
        let err = build_nodes(&config).err().unwrap();
        assert_eq!(err, BspError::NodeBudgetExceeded { nodes: 3, budget });
    }

    #[test]
    fn inner_nodes_hold_no_members() {
        let config = BuildConfig::new(6, 1);
        let built = build_nodes(&config).unwrap();
        for node in &built.nodes {
            if !node.is_leaf() {
                assert!(node.members().is_empty());
            }
        }
    }
}
