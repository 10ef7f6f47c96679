//! Linear-scan closest hit, without any acceleration structure.
//!
//! Tests every triangle that passes the same candidate checks the tree build
//! applies. Meant as a reference for validating trees and for meshes too
//! small to be worth indexing.

use crate::{MeshRef, Ray, RayHit, RayQuery, TriangleFlags, TriangleTest};

/// Finds the closest hit of `ray` over all candidate triangles of `mesh`.
///
/// A triangle is a candidate if its flags intersect `flag_mask` and it is not
/// degenerate; `query` filters and resolves hits exactly as tree traversal
/// does. Ray stamps are neither read nor written.
pub fn intersect<T>(
    mesh: &MeshRef<'_>,
    ray: &Ray,
    query: &RayQuery,
    flag_mask: TriangleFlags,
    test: &T,
) -> Option<RayHit>
where
    T: TriangleTest + ?Sized,
{
    if !ray.is_finite() {
        return None;
    }

    mesh.triangles()
        .iter()
        .enumerate()
        .filter(|(_, tri)| mesh.is_candidate(tri, flag_mask) && query.accepts(tri.flags()))
        .filter_map(|(index, tri)| {
            test.intersect(ray, &mesh.corners(tri))
                .map(|hit| (hit, index as u32))
        })
        .min_by(|(a, _), (b, _)| a.t.total_cmp(&b.t))
        .map(|(hit, index)| mesh.resolve_hit(hit, index, query.force_flat_normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MollerTrumbore, Real, Triangle};
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    /// Two parallel triangles at z = 0 and z = 2, plus a degenerate one at z = 4.
    fn make_stack() -> (Vec<Point3<Real>>, Vec<Vector3<Real>>, Vec<Triangle>) {
        let mut vertices = Vec::new();
        for z in [0.0, 2.0] {
            vertices.extend([
                Point3::new(-1.0, -1.0, z),
                Point3::new(1.0, -1.0, z),
                Point3::new(0.0, 1.0, z),
            ]);
        }
        vertices.extend([
            Point3::new(-1.0, -1.0, 4.0),
            Point3::new(1.0, 1.0, 4.0),
            Point3::new(0.0, 0.0, 4.0),
        ]);
        let normals = vec![Vector3::z(); vertices.len()];
        let triangles = vec![
            Triangle::new([0, 1, 2], TriangleFlags::GEOMETRY),
            Triangle::new([3, 4, 5], TriangleFlags::CAST_SHADOWS),
            Triangle::new([6, 7, 8], TriangleFlags::GEOMETRY),
        ];
        (vertices, normals, triangles)
    }

    #[test]
    fn returns_closest() {
        let (vertices, normals, triangles) = make_stack();
        let mesh = MeshRef::new(&vertices, &normals, &triangles).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), -Vector3::z(), 1);

        let hit = intersect(&mesh, &ray, &RayQuery::default(), TriangleFlags::all(), &MollerTrumbore).unwrap();
        assert_eq!(hit.triangle, 1);
        assert_relative_eq!(hit.distance, 8.0, epsilon = 1e-4);
    }

    #[test]
    fn mask_and_filter_exclude_triangles() {
        let (vertices, normals, triangles) = make_stack();
        let mesh = MeshRef::new(&vertices, &normals, &triangles).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), -Vector3::z(), 1);

        let hit = intersect(&mesh, &ray, &RayQuery::default(), TriangleFlags::GEOMETRY, &MollerTrumbore).unwrap();
        assert_eq!(hit.triangle, 0);

        let query = RayQuery::new().with_filter(TriangleFlags::MAKE_CAUSTICS);
        assert!(intersect(&mesh, &ray, &query, TriangleFlags::all(), &MollerTrumbore).is_none());
    }

    #[test]
    fn leaves_stamps_untouched() {
        let (vertices, normals, triangles) = make_stack();
        let mesh = MeshRef::new(&vertices, &normals, &triangles).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), -Vector3::z(), 77);

        intersect(&mesh, &ray, &RayQuery::default(), TriangleFlags::all(), &MollerTrumbore);
        assert!(triangles.iter().all(|t| t.last_ray() == 0));
    }
}
