//! Borrowed triangle mesh the tree is built over.

use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use nalgebra::{Point3, Vector3};

use crate::{Aabb, Barycentric, BspError, RayHit, Real, Result};

bitflags! {
    /// Per-triangle flag bits.
    ///
    /// Trees only index triangles whose flags intersect the build mask, and
    /// queries can narrow that set further with a filter. Bits without a name
    /// are allowed and carried through unchanged.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TriangleFlags: u32 {
        /// Regular scene geometry.
        const GEOMETRY         = 1 << 0;
        /// Triangle blocks shadow rays.
        const CAST_SHADOWS     = 1 << 1;
        /// Triangle refracts or reflects caustic photons.
        const MAKE_CAUSTICS    = 1 << 2;
        /// Triangle shows caustics cast onto it.
        const RECEIVE_CAUSTICS = 1 << 3;

        const _ = !0;
    }
}

impl Default for TriangleFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A triangle referencing three vertices of a shared vertex array.
///
/// The last-ray stamp lets a traversal skip a triangle it already tested
/// through another leaf. It is atomic so concurrent queries over the same
/// mesh never need a lock; a race only costs a redundant test.
#[derive(Debug)]
pub struct Triangle {
    points: [u32; 3],
    flags: TriangleFlags,
    last_ray: AtomicU64,
}

impl Triangle {
    /// Creates a triangle from three vertex indices.
    pub fn new(points: [u32; 3], flags: TriangleFlags) -> Self {
        Self {
            points,
            flags,
            last_ray: AtomicU64::new(0),
        }
    }

    /// Returns the three vertex indices.
    #[inline]
    pub fn points(&self) -> [u32; 3] {
        self.points
    }

    /// Returns the triangle's flag bits.
    #[inline]
    pub fn flags(&self) -> TriangleFlags {
        self.flags
    }

    /// Id of the last ray that tested this triangle (`0` if none).
    #[inline]
    pub fn last_ray(&self) -> u64 {
        self.last_ray.load(Ordering::Relaxed)
    }

    /// Forgets the last-ray stamp.
    pub fn clear_stamp(&self) {
        self.last_ray.store(0, Ordering::Relaxed);
    }

    /// Stamps the triangle with `ray_id`.
    ///
    /// Returns `true` if it already carried that stamp. Ray id `0` never
    /// counts as already tested.
    #[inline]
    pub(crate) fn stamp(&self, ray_id: u64) -> bool {
        if ray_id == 0 {
            return false;
        }
        self.last_ray.swap(ray_id, Ordering::Relaxed) == ray_id
    }
}

impl Clone for Triangle {
    fn clone(&self) -> Self {
        Self {
            points: self.points,
            flags: self.flags,
            last_ray: AtomicU64::new(self.last_ray()),
        }
    }
}

/// Borrowed view of a triangle mesh: vertex positions, per-vertex normals and
/// triangles indexing both.
///
/// Construction validates every vertex index, so all accessors can index the
/// slices directly.
#[derive(Debug, Clone, Copy)]
pub struct MeshRef<'m> {
    vertices: &'m [Point3<Real>],
    normals: &'m [Vector3<Real>],
    triangles: &'m [Triangle],
}

impl<'m> MeshRef<'m> {
    /// Creates a mesh view, checking that every triangle references existing
    /// vertices and that there is one normal per vertex.
    pub fn new(
        vertices: &'m [Point3<Real>],
        normals: &'m [Vector3<Real>],
        triangles: &'m [Triangle],
    ) -> Result<Self> {
        check_triangle_count(triangles.len())?;
        if vertices.len() != normals.len() {
            return Err(BspError::NormalCountMismatch {
                vertices: vertices.len(),
                normals: normals.len(),
            });
        }

        for (index, triangle) in triangles.iter().enumerate() {
            if let Some(&vertex) = triangle
                .points
                .iter()
                .find(|&&p| p as usize >= vertices.len())
            {
                return Err(BspError::VertexOutOfRange {
                    triangle: index,
                    vertex,
                    vertex_count: vertices.len(),
                });
            }
        }

        Ok(Self {
            vertices,
            normals,
            triangles,
        })
    }

    /// Returns the vertex positions.
    #[inline]
    pub fn vertices(&self) -> &'m [Point3<Real>] {
        self.vertices
    }

    /// Returns the per-vertex normals.
    #[inline]
    pub fn normals(&self) -> &'m [Vector3<Real>] {
        self.normals
    }

    /// Returns the triangles.
    #[inline]
    pub fn triangles(&self) -> &'m [Triangle] {
        self.triangles
    }

    /// Returns the three corner positions of a triangle.
    #[inline]
    pub fn corners(&self, triangle: &Triangle) -> [Point3<Real>; 3] {
        triangle.points.map(|p| self.vertices[p as usize])
    }

    /// Computes the (unnormalized) face normal `(b - a) × (c - a)`.
    pub fn face_normal(&self, triangle: &Triangle) -> Vector3<Real> {
        let [a, b, c] = self.corners(triangle);
        (b - a).cross(&(c - a))
    }

    /// Checks if a triangle has a zero face normal or zero vertex-normal sum.
    pub fn is_degenerate(&self, triangle: &Triangle) -> bool {
        let normal_sum: Vector3<Real> = triangle
            .points
            .iter()
            .map(|&p| self.normals[p as usize])
            .sum();
        self.face_normal(triangle) == Vector3::zeros() || normal_sum == Vector3::zeros()
    }

    /// Checks if a triangle takes part in a tree built with `flag_mask`.
    pub fn is_candidate(&self, triangle: &Triangle, flag_mask: TriangleFlags) -> bool {
        triangle.flags.intersects(flag_mask) && !self.is_degenerate(triangle)
    }

    /// Computes the bounding box of a triangle.
    pub fn triangle_bounds(&self, triangle: &Triangle) -> Aabb {
        let [a, b, c] = self.corners(triangle);
        let mut aabb = Aabb::from_point(a);
        aabb.grow(b);
        aabb.grow(c);
        aabb
    }

    /// Geometric normal, independent of the stored vertex normals.
    ///
    /// Uses `(-(c - a)) × (b - a)`, which points the same way as
    /// [`face_normal`](Self::face_normal).
    pub fn flat_normal(&self, triangle: &Triangle) -> Vector3<Real> {
        let [a, b, c] = self.corners(triangle);
        normalize_or_zero((-(c - a)).cross(&(b - a)))
    }

    /// Vertex normals blended with barycentric weights `(1 - u - v, u, v)`.
    pub fn smooth_normal(&self, triangle: &Triangle, u: Real, v: Real) -> Vector3<Real> {
        let [n0, n1, n2] = triangle.points.map(|p| self.normals[p as usize]);
        normalize_or_zero(n0 * (1.0 - u - v) + n1 * u + n2 * v)
    }

    /// Turns a raw leaf-test result into a hit record.
    pub(crate) fn resolve_hit(&self, hit: Barycentric, triangle: u32, flat: bool) -> RayHit {
        let tri = &self.triangles[triangle as usize];
        let smooth = if flat {
            Vector3::zeros()
        } else {
            self.smooth_normal(tri, hit.u, hit.v)
        };
        // Vertex normals can still cancel at an interior point
        let normal = if smooth == Vector3::zeros() {
            self.flat_normal(tri)
        } else {
            smooth
        };

        RayHit {
            distance: hit.t,
            normal,
            triangle: triangle as usize,
            u: hit.u,
            v: hit.v,
        }
    }
}

/// Leaves store triangle indices as `u32`.
fn check_triangle_count(count: usize) -> Result<()> {
    if u32::try_from(count).is_err() {
        return Err(BspError::TooManyTriangles { count });
    }
    Ok(())
}

fn normalize_or_zero(v: Vector3<Real>) -> Vector3<Real> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}
