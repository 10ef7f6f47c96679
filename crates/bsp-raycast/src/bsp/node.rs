//! BSP tree node implementation.

use nalgebra::Point3;

use crate::{Aabb, Real};

/// Index of a node in a tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "node arena overflow");
        Self(index as u32)
    }

    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the BSP tree.
///
/// Every node covers an axis-aligned box. Inner nodes split their box with a
/// plane perpendicular to `axis` into a low child (coordinates below the
/// plane) and a high child. Leaves hold the indices of the triangles whose
/// bounding boxes overlap the leaf box; a triangle straddling a split plane
/// is referenced by leaves on both sides.
#[derive(Debug, Clone)]
pub struct BspNode {
    /// Region covered by this node.
    bounds: Aabb,

    /// Split axis (0 = x, 1 = y, 2 = z). For leaves this is only the axis
    /// hint handed down by the parent.
    axis: usize,

    /// Split plane coordinate along `axis`; equals `low.max[axis]`.
    split: Real,

    /// Low and high child, or `None` for a leaf.
    children: Option<[NodeId; 2]>,

    /// Triangle indices; empty for inner nodes.
    members: Vec<u32>,
}

impl BspNode {
    /// Creates a leaf covering `bounds` with no triangles.
    pub fn new(bounds: Aabb, axis: usize) -> Self {
        Self {
            bounds,
            axis,
            split: bounds.min[axis],
            children: None,
            members: Vec::new(),
        }
    }

    /// Returns the region covered by this node.
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Returns the minimum corner.
    #[inline]
    pub fn min(&self) -> Point3<Real> {
        self.bounds.min
    }

    /// Returns the maximum corner.
    #[inline]
    pub fn max(&self) -> Point3<Real> {
        self.bounds.max
    }

    /// Returns the split axis.
    #[inline]
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Returns the split plane coordinate, or `None` for a leaf.
    #[inline]
    pub fn split(&self) -> Option<Real> {
        self.children.map(|_| self.split)
    }

    /// Returns `[low, high]`, or `None` for a leaf.
    #[inline]
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    /// Returns the child below the split plane.
    #[inline]
    pub fn low(&self) -> Option<NodeId> {
        self.children.map(|[low, _]| low)
    }

    /// Returns the child above the split plane.
    #[inline]
    pub fn high(&self) -> Option<NodeId> {
        self.children.map(|[_, high]| high)
    }

    /// Checks if this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Returns the triangle indices stored in this leaf.
    #[inline]
    pub fn members(&self) -> &[u32] {
        &self.members
    }

    /// Turns the node into an inner node split at `split` along `axis`.
    pub(crate) fn set_split(&mut self, axis: usize, split: Real, children: [NodeId; 2]) {
        self.axis = axis;
        self.split = split;
        self.children = Some(children);
        self.members = Vec::new();
    }

    /// Stores the leaf's triangles.
    pub(crate) fn set_members(&mut self, members: Vec<u32>) {
        debug_assert!(self.is_leaf(), "only leaves hold triangles");
        self.members = members;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bounds() -> Aabb {
        Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0))
    }

    #[test]
    fn new_node_is_empty_leaf() {
        let node = BspNode::new(make_bounds(), 1);

        assert!(node.is_leaf());
        assert!(node.members().is_empty());
        assert!(node.children().is_none());
        assert!(node.split().is_none());
        assert_eq!(node.axis(), 1);
    }

    #[test]
    fn set_split_updates_leaf_status() {
        let mut node = BspNode::new(make_bounds(), 0);
        node.set_members(vec![0, 1]);
        node.set_split(0, 0.75, [NodeId::new(1), NodeId::new(2)]);

        assert!(!node.is_leaf());
        assert_eq!(node.low(), Some(NodeId::new(1)));
        assert_eq!(node.high(), Some(NodeId::new(2)));
        assert_eq!(node.split(), Some(0.75));
        // Inner nodes drop their triangles
        assert!(node.members().is_empty());
    }

    #[test]
    fn node_id_round_trips_index() {
        assert_eq!(NodeId::ROOT.index(), 0);
        assert_eq!(NodeId::new(42).index(), 42);
    }
}
