//! Rays, query options and hit records.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::{Point3, Vector3};

use crate::{Real, TriangleFlags};

/// A ray with a unit direction and an id used for per-query deduplication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3<Real>,
    /// Unit direction of the ray.
    pub direction: Vector3<Real>,
    /// Query id. Must be unique per query for deduplication to apply;
    /// `0` disables it. See [`RayIdGenerator`].
    pub id: u64,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// A zero direction produces a ray that misses everything.
    pub fn new(origin: Point3<Real>, direction: Vector3<Real>, id: u64) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            id,
        }
    }

    /// Evaluates the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: Real) -> Point3<Real> {
        self.origin + self.direction * t
    }

    /// Checks if origin and direction are finite.
    pub fn is_finite(&self) -> bool {
        self.origin.iter().chain(self.direction.iter()).all(|c| c.is_finite())
    }
}

/// Hands out unique, non-zero ray ids.
///
/// Share one generator between all threads querying the same mesh.
#[derive(Debug)]
pub struct RayIdGenerator {
    next: AtomicU64,
}

impl RayIdGenerator {
    /// Creates a generator whose first id is `1`.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns a fresh id.
    pub fn next_id(&self) -> u64 {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        if id == 0 {
            // Wrapped around; 0 is reserved for "no deduplication"
            self.next.fetch_add(1, Ordering::Relaxed)
        } else {
            id
        }
    }

    /// Creates a ray carrying a fresh id.
    pub fn ray(&self, origin: Point3<Real>, direction: Vector3<Real>) -> Ray {
        Ray::new(origin, direction, self.next_id())
    }
}

impl Default for RayIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-query options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayQuery {
    /// Only triangles whose flags intersect this set are tested.
    /// An empty set tests every indexed triangle.
    pub flag_filter: TriangleFlags,
    /// Report the geometric face normal instead of the interpolated vertex normal.
    pub force_flat_normal: bool,
}

impl RayQuery {
    /// Creates a query with no filter and smooth normals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the query to triangles carrying any of `flags`.
    pub fn with_filter(mut self, flags: TriangleFlags) -> Self {
        self.flag_filter = flags;
        self
    }

    /// Selects flat (geometric) normals.
    pub fn with_flat_normals(mut self, flat: bool) -> Self {
        self.force_flat_normal = flat;
        self
    }

    /// Checks if a triangle with `flags` passes the filter.
    #[inline]
    pub fn accepts(&self, flags: TriangleFlags) -> bool {
        self.flag_filter.is_empty() || flags.intersects(self.flag_filter)
    }
}

/// Closest intersection found by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray (always positive).
    pub distance: Real,
    /// Unit normal at the hit point.
    pub normal: Vector3<Real>,
    /// Index of the hit triangle in the mesh's triangle slice.
    pub triangle: usize,
    /// Barycentric weight of the second vertex.
    pub u: Real,
    /// Barycentric weight of the third vertex.
    pub v: Real,
}

impl RayHit {
    /// World-space hit point for the ray that produced this hit.
    pub fn point(&self, ray: &Ray) -> Point3<Real> {
        ray.at(self.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_normalizes_direction() {
        let ray = Ray::new(Point3::origin(), Vector3::new(3.0, 0.0, 4.0), 7);
        assert_relative_eq!(ray.direction.norm(), 1.0);
        assert_relative_eq!(ray.at(5.0), Point3::new(3.0, 0.0, 4.0), epsilon = 1e-5);
        assert_eq!(ray.id, 7);
    }

    #[test]
    fn zero_direction_is_not_finite() {
        let ray = Ray::new(Point3::origin(), Vector3::zeros(), 1);
        assert!(!ray.is_finite());
    }

    #[test]
    fn generator_ids_are_unique_and_nonzero() {
        let ids = RayIdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert_ne!(ids.ray(Point3::origin(), Vector3::x()).id, b);
    }

    #[test]
    fn query_filter() {
        let query = RayQuery::new();
        assert!(query.accepts(TriangleFlags::empty()));
        assert!(query.accepts(TriangleFlags::GEOMETRY));

        let shadows = RayQuery::new().with_filter(TriangleFlags::CAST_SHADOWS);
        assert!(shadows.accepts(TriangleFlags::CAST_SHADOWS | TriangleFlags::GEOMETRY));
        assert!(!shadows.accepts(TriangleFlags::GEOMETRY));
    }
}
