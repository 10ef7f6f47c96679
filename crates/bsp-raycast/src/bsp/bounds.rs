//! Per-triangle bounding boxes used while building a tree.

use log::warn;

use crate::{Aabb, MeshRef, TriangleFlags};

/// Bounding boxes of every candidate triangle of a mesh.
///
/// Candidates are the triangles that match the flag mask and are not
/// degenerate. Each gets a slot; during subdivision nodes carry slot numbers,
/// which become triangle indices once a node turns into a leaf. The cache is
/// dropped as soon as the tree is built.
#[derive(Debug, Clone)]
pub struct TriangleBoundsCache {
    /// `(triangle index, bounds)` per slot.
    entries: Vec<(u32, Aabb)>,
    discarded: usize,
}

impl TriangleBoundsCache {
    /// Collects the candidate triangles of `mesh` and computes their bounds.
    pub fn new(mesh: &MeshRef<'_>, flag_mask: TriangleFlags) -> Self {
        let mut entries = Vec::with_capacity(mesh.triangles().len());
        let mut discarded = 0;

        for (index, triangle) in mesh.triangles().iter().enumerate() {
            if !triangle.flags().intersects(flag_mask) {
                continue;
            }
            if mesh.is_degenerate(triangle) {
                discarded += 1;
                continue;
            }
            // MeshRef::new caps the triangle count at u32::MAX
            entries.push((index as u32, mesh.triangle_bounds(triangle)));
        }

        if discarded > 0 {
            warn!("skipped {discarded} degenerate triangles");
        }

        Self { entries, discarded }
    }

    /// Number of candidate triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no triangle qualified.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of masked-in triangles dropped as degenerate.
    #[inline]
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Returns the bounds stored in `slot`.
    #[inline]
    pub fn bounds(&self, slot: u32) -> &Aabb {
        &self.entries[slot as usize].1
    }

    /// Returns the mesh triangle index stored in `slot`.
    #[inline]
    pub fn triangle(&self, slot: u32) -> u32 {
        self.entries[slot as usize].0
    }

    /// Iterates over all slot numbers.
    pub fn slots(&self) -> impl Iterator<Item = u32> {
        0..self.entries.len() as u32
    }

    /// Union of all candidate bounds, or `None` if there are no candidates.
    pub fn scene_bounds(&self) -> Option<Aabb> {
        let mut entries = self.entries.iter();
        let mut scene = entries.next()?.1;
        for (_, aabb) in entries {
            scene.merge(aabb);
        }
        Some(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Real, Triangle};
    use nalgebra::{Point3, Vector3};

    fn make_vertices() -> Vec<Point3<Real>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
            Point3::new(2.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn filters_by_mask_and_degeneracy() {
        let vertices = make_vertices();
        let normals = vec![Vector3::z(); vertices.len()];
        let triangles = [
            Triangle::new([0, 1, 2], TriangleFlags::GEOMETRY),
            Triangle::new([0, 2, 3], TriangleFlags::CAST_SHADOWS),
            Triangle::new([0, 1, 4], TriangleFlags::GEOMETRY),
            Triangle::new([1, 2, 3], TriangleFlags::GEOMETRY | TriangleFlags::CAST_SHADOWS),
        ];
        let mesh = MeshRef::new(&vertices, &normals, &triangles).unwrap();

        let cache = TriangleBoundsCache::new(&mesh, TriangleFlags::GEOMETRY);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.discarded(), 1);
        assert_eq!(cache.triangle(0), 0);
        assert_eq!(cache.triangle(1), 3);
        assert_eq!(cache.bounds(1).max, Point3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn scene_bounds_is_union() {
        let vertices = make_vertices();
        let normals = vec![Vector3::z(); vertices.len()];
        let triangles = [
            Triangle::new([0, 1, 2], TriangleFlags::GEOMETRY),
            Triangle::new([0, 2, 3], TriangleFlags::GEOMETRY),
        ];
        let mesh = MeshRef::new(&vertices, &normals, &triangles).unwrap();

        let scene = TriangleBoundsCache::new(&mesh, TriangleFlags::GEOMETRY)
            .scene_bounds()
            .unwrap();
        assert_eq!(scene.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(scene.max, Point3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn empty_when_nothing_matches() {
        let vertices = make_vertices();
        let normals = vec![Vector3::z(); vertices.len()];
        let triangles = [Triangle::new([0, 1, 2], TriangleFlags::CAST_SHADOWS)];
        let mesh = MeshRef::new(&vertices, &normals, &triangles).unwrap();

        let cache = TriangleBoundsCache::new(&mesh, TriangleFlags::GEOMETRY);
        assert!(cache.is_empty());
        assert!(cache.scene_bounds().is_none());
    }
}
