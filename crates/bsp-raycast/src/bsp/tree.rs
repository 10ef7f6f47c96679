//! BSP tree container, construction and ray traversal.

use log::debug;

use crate::brute_force;
use crate::{
    Aabb, Barycentric, BspError, BspNode, BuildConfig, MeshRef, MollerTrumbore, NodeId, Ray,
    RayHit, RayQuery, Real, Result, StackEntry, TraversalStack, TreeStats, Triangle,
    TriangleBoundsCache, TriangleTest, VECTOR_EPSILON,
};

use super::builder::TreeBuilder;
use super::triangle_test::AxisAlignedX;

/// An axis-aligned BSP tree over the triangles of a borrowed mesh.
///
/// # Construction
///
/// Trees are built once from a [`MeshRef`] and a [`BuildConfig`]. Every inner
/// node splits its box across the longest axis at
/// [`split_fraction`](BuildConfig::split_fraction) of the extent; triangles
/// overlapping both halves are referenced from both.
///
/// ```ignore
/// let mesh = MeshRef::new(&vertices, &normals, &triangles)?;
/// let tree = BspTree::build(mesh, BuildConfig::new(20, 8))?;
/// ```
///
/// # Queries
///
/// [`intersect`](Self::intersect) returns the closest hit along a ray. It
/// only reads the tree, so a `&BspTree` can be shared between threads as long
/// as every thread traces rays with distinct ids.
///
/// ```ignore
/// let ray = ids.ray(origin, direction);
/// if let Some(hit) = tree.intersect(&ray, &RayQuery::default())? {
///     shade(hit.point(&ray), hit.normal);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BspTree<'m> {
    mesh: MeshRef<'m>,
    nodes: Vec<BspNode>,
    bounds: Aabb,
    config: BuildConfig,
    stats: TreeStats,
}

impl<'m> BspTree<'m> {
    /// Builds a tree over the triangles of `mesh` that match the configured
    /// flag mask.
    ///
    /// Degenerate triangles (zero face normal or zero vertex-normal sum) are
    /// skipped. Fails if no triangle qualifies, if the configuration is
    /// invalid, or if subdivision runs over the node memory budget; no partial
    /// tree is ever returned.
    pub fn build(mesh: MeshRef<'m>, config: BuildConfig) -> Result<Self> {
        config.validate()?;

        let cache = TriangleBoundsCache::new(&mesh, config.flag_mask);
        let scene = cache.scene_bounds().ok_or(BspError::NoTriangles {
            total: mesh.triangles().len(),
        })?;
        let bounds = scene.inflated(VECTOR_EPSILON);

        let built = TreeBuilder::new(&config, &cache).build(bounds)?;

        let mut stats = TreeStats::collect(&built.nodes);
        stats.duplicated_triangles = built.duplicated;
        stats.candidate_triangles = cache.len();
        stats.discarded_triangles = cache.discarded();
        debug!("generated tree: {stats}");

        Ok(Self {
            mesh,
            nodes: built.nodes,
            bounds,
            config,
            stats,
        })
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> &BspNode {
        &self.nodes[NodeId::ROOT.index()]
    }

    /// Returns a node by id.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this tree.
    #[inline]
    pub fn node(&self, id: NodeId) -> &BspNode {
        &self.nodes[id.index()]
    }

    /// Returns all nodes in arena order.
    #[inline]
    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    /// Iterates over the leaves in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = &BspNode> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// Scene bounds (union of all indexed triangles, slightly inflated).
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Returns the configuration the tree was built with.
    #[inline]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Returns the build statistics.
    #[inline]
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Returns the indexed mesh.
    #[inline]
    pub fn mesh(&self) -> MeshRef<'m> {
        self.mesh
    }

    /// Returns a mesh triangle by index (as found in [`RayHit::triangle`]).
    #[inline]
    pub fn triangle(&self, index: usize) -> Option<&'m Triangle> {
        self.mesh.triangles().get(index)
    }

    /// Depth of the deepest leaf (0 for a single-leaf tree).
    #[inline]
    pub fn depth(&self) -> usize {
        self.stats.max_depth
    }

    /// Finds the closest triangle hit by `ray`.
    ///
    /// Returns `Ok(None)` if the ray misses the scene bounds or every
    /// triangle. Errors only if the traversal stack overflows, which trees
    /// from [`build`](Self::build) cannot cause.
    pub fn intersect(&self, ray: &Ray, query: &RayQuery) -> Result<Option<RayHit>> {
        let mut stack = TraversalStack::new();
        self.intersect_with(ray, query, &MollerTrumbore, &mut stack)
    }

    /// Same as [`intersect`](Self::intersect) for rays pointing along `+X`,
    /// using the [`AxisAlignedX`] leaf test.
    pub fn intersect_x(&self, ray: &Ray, query: &RayQuery) -> Result<Option<RayHit>> {
        let mut stack = TraversalStack::new();
        self.intersect_with(ray, query, &AxisAlignedX, &mut stack)
    }

    /// Closest-hit traversal with a caller-supplied leaf test and stack.
    ///
    /// Descends near child first, deferring far children on `stack`, and
    /// stops as soon as the best hit so far lies strictly inside the leaf
    /// being processed: every deferred node is farther along the ray.
    pub fn intersect_with<T>(
        &self,
        ray: &Ray,
        query: &RayQuery,
        test: &T,
        stack: &mut TraversalStack,
    ) -> Result<Option<RayHit>>
    where
        T: TriangleTest + ?Sized,
    {
        if !ray.is_finite() {
            return Ok(None);
        }
        let Some((entry, exit)) = self.bounds.intersect_ray(ray) else {
            return Ok(None);
        };
        let mut min_dist = entry - VECTOR_EPSILON;
        let mut max_dist = exit + VECTOR_EPSILON;

        stack.reset();
        let mut best: Option<(Barycentric, u32)> = None;
        let mut current = Some(NodeId::ROOT);

        while let Some(mut id) = current {
            // Descend to a leaf
            loop {
                let node = &self.nodes[id.index()];
                let (Some([low, high]), Some(split)) = (node.children(), node.split()) else {
                    break;
                };
                let axis = node.axis();
                let origin = ray.origin[axis];
                let direction = ray.direction[axis];

                let plane_dist = plane_distance(split, origin, direction);
                let (near, far) = if split >= origin { (low, high) } else { (high, low) };

                if plane_dist.abs() < VECTOR_EPSILON {
                    // Origin on the split plane: the direction decides
                    if direction > 0.0 {
                        id = high;
                    } else if direction < 0.0 {
                        id = low;
                    } else {
                        stack.push(StackEntry::new(low, min_dist, plane_dist))?;
                        id = high;
                    }
                } else if plane_dist >= max_dist || plane_dist < 0.0 {
                    id = near;
                } else if plane_dist < min_dist {
                    id = far;
                } else {
                    stack.push(StackEntry::new(far, plane_dist, max_dist))?;
                    id = near;
                    max_dist = plane_dist;
                }
            }

            let leaf = &self.nodes[id.index()];
            for &index in leaf.members() {
                let triangle = &self.mesh.triangles()[index as usize];
                if !query.accepts(triangle.flags()) || triangle.stamp(ray.id) {
                    continue;
                }
                let Some(hit) = test.intersect(ray, &self.mesh.corners(triangle)) else {
                    continue;
                };
                if best.is_none_or(|(closest, _)| hit.t < closest.t) {
                    best = Some((hit, index));
                }
            }

            if let Some((hit, index)) = best {
                if leaf.bounds().contains_point_strict(&ray.at(hit.t)) {
                    return Ok(Some(self.mesh.resolve_hit(hit, index, query.force_flat_normal)));
                }
            }

            match stack.pop() {
                Some(entry) => {
                    current = entry.node;
                    min_dist = entry.min_distance;
                    max_dist = entry.max_distance;
                }
                None => current = None,
            }
        }

        Ok(best.map(|(hit, index)| self.mesh.resolve_hit(hit, index, query.force_flat_normal)))
    }

    /// Tests every indexed triangle without using the tree.
    ///
    /// Gives the same answer as [`intersect`](Self::intersect) up to
    /// floating point ties; useful as a reference.
    pub fn intersect_brute_force(&self, ray: &Ray, query: &RayQuery) -> Option<RayHit> {
        brute_force::intersect(&self.mesh, ray, query, self.config.flag_mask, &MollerTrumbore)
    }
}

/// Distance along the ray to the plane `coord[axis] == split`.
///
/// An origin exactly on the plane gives `0` even when the ray runs parallel
/// to it; otherwise a parallel ray gives an infinite distance.
#[inline]
fn plane_distance(split: Real, origin: Real, direction: Real) -> Real {
    let delta = split - origin;
    if delta == 0.0 { 0.0 } else { delta / direction }
}
