//! Mesh and ray generators shared by the integration tests.

#![allow(dead_code)]

use bsp_raycast::{Real, Triangle, TriangleFlags};
use nalgebra::{Point3, Vector3};
use rand::Rng;

/// Vertex, vertex-normal and triangle arrays of an owned test mesh.
pub struct MeshData {
    pub vertices: Vec<Point3<Real>>,
    pub normals: Vec<Vector3<Real>>,
    pub triangles: Vec<Triangle>,
}

impl MeshData {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Appends a triangle with its own three vertices, using the face normal
    /// as vertex normal.
    pub fn push(&mut self, corners: [Point3<Real>; 3], flags: TriangleFlags) {
        let base = self.vertices.len() as u32;
        let normal = (corners[1] - corners[0])
            .cross(&(corners[2] - corners[0]))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::z);
        self.vertices.extend(corners);
        self.normals.extend([normal; 3]);
        self.triangles
            .push(Triangle::new([base, base + 1, base + 2], flags));
    }
}

pub fn random_point(rng: &mut impl Rng, extent: Real) -> Point3<Real> {
    Point3::new(
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
    )
}

pub fn random_direction(rng: &mut impl Rng) -> Vector3<Real> {
    loop {
        let v = random_point(rng, 1.0).coords;
        if let Some(unit) = v.try_normalize(1e-3) {
            return unit;
        }
    }
}

/// `count` random triangles of size up to `size` scattered in a cube of
/// half-width `extent`, with mixed flags.
pub fn random_soup(rng: &mut impl Rng, count: usize, extent: Real, size: Real) -> MeshData {
    let flags = [
        TriangleFlags::GEOMETRY,
        TriangleFlags::GEOMETRY | TriangleFlags::CAST_SHADOWS,
        TriangleFlags::CAST_SHADOWS,
        TriangleFlags::RECEIVE_CAUSTICS,
    ];
    let mut mesh = MeshData::new();
    for i in 0..count {
        let anchor = random_point(rng, extent);
        let corners = [
            anchor,
            anchor + random_point(rng, size).coords,
            anchor + random_point(rng, size).coords,
        ];
        mesh.push(corners, flags[i % flags.len()]);
    }
    mesh
}

/// Axis-aligned unit direction `sign * e_axis`.
pub fn axis_direction(axis: usize, sign: Real) -> Vector3<Real> {
    let mut v = Vector3::zeros();
    v[axis] = sign;
    v
}
