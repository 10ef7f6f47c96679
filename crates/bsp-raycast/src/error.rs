//! Error types for tree construction and traversal.

use thiserror::Error;

use crate::Real;

/// Errors reported by mesh validation, tree construction and traversal.
///
/// Construction errors never leave a partial tree behind; a caller that gets
/// one should fall back to [`brute_force`](crate::brute_force) rather than
/// retry with the same configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum BspError {
    /// No triangle survived flag masking and degeneracy checks.
    #[error("no usable triangles: {total} triangles, none match the flag mask and are non-degenerate")]
    NoTriangles {
        /// Number of triangles in the input mesh.
        total: usize,
    },

    /// The requested depth does not fit the traversal stack.
    #[error("max depth {max_depth} exceeds traversal stack capacity {capacity}")]
    DepthExceedsStack {
        /// Requested maximum tree depth.
        max_depth: usize,
        /// Fixed traversal stack capacity.
        capacity: usize,
    },

    /// Subdivision would have exceeded the node memory budget.
    #[error("node memory budget exceeded: {nodes} nodes need more than {budget} bytes")]
    NodeBudgetExceeded {
        /// Node count at the time of the abort.
        nodes: usize,
        /// Configured budget in bytes.
        budget: usize,
    },

    /// The split fraction is outside the open interval (0, 1).
    #[error("split fraction {0} is not strictly between 0 and 1")]
    InvalidSplitFraction(Real),

    /// A triangle references a vertex past the end of the vertex array.
    #[error("triangle {triangle} references vertex {vertex}, but there are only {vertex_count} vertices")]
    VertexOutOfRange {
        /// Index of the offending triangle.
        triangle: usize,
        /// Offending vertex index.
        vertex: u32,
        /// Length of the vertex array.
        vertex_count: usize,
    },

    /// The mesh has more triangles than a `u32` index can address.
    #[error("{count} triangles exceed the u32 index range")]
    TooManyTriangles {
        /// Number of triangles in the input mesh.
        count: usize,
    },

    /// Vertex and vertex-normal arrays have different lengths.
    #[error("{vertices} vertices but {normals} vertex normals")]
    NormalCountMismatch {
        /// Length of the vertex array.
        vertices: usize,
        /// Length of the normal array.
        normals: usize,
    },

    /// A traversal pushed more entries than the stack holds.
    #[error("traversal stack overflow (capacity {capacity})")]
    StackOverflow {
        /// Stack capacity.
        capacity: usize,
    },
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, BspError>;
