#![warn(missing_docs)]

//! Axis-aligned BSP tree for closest-hit ray/triangle queries.
//!
//! The tree is built once over a static, externally owned triangle mesh and
//! then answers "what does this ray hit first" queries with an iterative,
//! stack-based traversal. The build only ever reads the mesh, so the tree
//! simply borrows it for its whole lifetime.
//!
//! # Example
//!
//! ```
//! use bsp_raycast::{BspTree, BuildConfig, MeshRef, Ray, RayQuery, Triangle, TriangleFlags};
//! use nalgebra::{Point3, Vector3};
//!
//! let vertices = [
//!     Point3::new(-1.0, -1.0, 0.0),
//!     Point3::new(1.0, -1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let normals = [Vector3::z(); 3];
//! let triangles = [Triangle::new([0, 1, 2], TriangleFlags::GEOMETRY)];
//!
//! let mesh = MeshRef::new(&vertices, &normals, &triangles)?;
//! let tree = BspTree::build(mesh, BuildConfig::default())?;
//!
//! let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vector3::z(), 1);
//! let hit = tree.intersect(&ray, &RayQuery::default())?.expect("ray hits the triangle");
//! assert!((hit.distance - 5.0).abs() < 1e-4);
//! # Ok::<(), bsp_raycast::BspError>(())
//! ```
//!
//! # Architecture
//!
//! - [`MeshRef`]: borrowed vertex, vertex-normal and triangle slices
//! - [`BspTree`]: node arena plus scene bounds, built from a [`MeshRef`]
//! - [`BuildConfig`]: depth, leaf size, flag mask, split fraction and memory budget
//! - [`TraversalStack`]: per-query explicit stack for the iterative descent
//! - [`TriangleTest`]: leaf-level ray/triangle test strategy
//! - [`brute_force`]: linear-scan fallback over the same triangle set

mod aabb;
pub mod brute_force;
pub mod bsp;
mod error;
mod mesh;
mod ray;
mod real;

pub use aabb::Aabb;
pub use bsp::{
    AxisAlignedX, Barycentric, BspNode, BspTree, BuildConfig, MollerTrumbore, NodeId,
    StackEntry, TraversalStack, TreeStats, TriangleBoundsCache, TriangleTest,
    DEFAULT_NODE_MEMORY_BUDGET, DEFAULT_SPLIT_FRACTION, TRAVERSAL_STACK_CAPACITY,
};
pub use error::{BspError, Result};
pub use mesh::{MeshRef, Triangle, TriangleFlags};
pub use ray::{Ray, RayHit, RayIdGenerator, RayQuery};
pub use real::{Real, TRIANGLE_EPSILON, VECTOR_EPSILON};
