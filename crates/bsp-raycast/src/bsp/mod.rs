//! Axis-aligned Binary Space Partitioning tree over a triangle mesh.
//!
//! The tree recursively halves an axis-aligned box along its longest axis and
//! stores triangle indices in the leaves. It answers closest-hit ray queries
//! with an iterative near-to-far traversal:
//!
//! - Near child first, far child deferred on an explicit [`TraversalStack`]
//! - Early exit once the best hit lies inside the current leaf
//! - Per-triangle ray stamps so straddling triangles are tested once per ray
//!
//! # Example
//!
//! ```ignore
//! use bsp_raycast::{BspTree, BuildConfig, MeshRef, RayIdGenerator, RayQuery};
//!
//! let mesh = MeshRef::new(&vertices, &normals, &triangles)?;
//! let tree = BspTree::build(mesh, BuildConfig::new(20, 8))?;
//!
//! let ids = RayIdGenerator::new();
//! let ray = ids.ray(eye, direction);
//! let hit = tree.intersect(&ray, &RayQuery::default())?;
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: the node arena, scene bounds and query entry points
//! - [`BspNode`]: an inner node (split plane, two children) or a leaf (triangle indices)
//! - [`TriangleBoundsCache`]: per-triangle boxes used while building
//! - [`TriangleTest`]: strategy trait for the leaf-level ray/triangle test

mod bounds;
mod builder;
mod config;
mod node;
mod stack;
mod stats;
mod tree;

pub use bounds::TriangleBoundsCache;
pub use config::{BuildConfig, DEFAULT_NODE_MEMORY_BUDGET, DEFAULT_SPLIT_FRACTION};
pub use node::{BspNode, NodeId};
pub use stack::{StackEntry, TraversalStack, TRAVERSAL_STACK_CAPACITY};
pub use stats::TreeStats;
pub use tree::BspTree;
pub use triangle_test::{AxisAlignedX, Barycentric, MollerTrumbore, TriangleTest};
