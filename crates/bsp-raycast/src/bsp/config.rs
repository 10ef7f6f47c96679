//! Build parameters.

use crate::{BspError, Real, Result, TriangleFlags, TRAVERSAL_STACK_CAPACITY};

/// Default split position as a fraction of the node extent.
///
/// Slightly below one half so split planes rarely land exactly on
/// symmetric geometry.
pub const DEFAULT_SPLIT_FRACTION: Real = 0.499999;

/// Default upper bound on memory used by tree nodes (512 MiB).
pub const DEFAULT_NODE_MEMORY_BUDGET: usize = 512 * 1024 * 1024;

/// Parameters controlling tree construction.
///
/// ```
/// use bsp_raycast::{BuildConfig, TriangleFlags};
///
/// let config = BuildConfig::new(20, 4).with_flag_mask(TriangleFlags::GEOMETRY);
/// assert_eq!(config.max_depth, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildConfig {
    /// Only triangles whose flags intersect this mask are indexed.
    pub flag_mask: TriangleFlags,
    /// Nodes at this depth always become leaves. Must be below
    /// [`TRAVERSAL_STACK_CAPACITY`].
    pub max_depth: usize,
    /// Nodes holding at most this many triangles become leaves.
    pub max_leaf_size: usize,
    /// Split position as a fraction of the node extent along the split axis.
    pub split_fraction: Real,
    /// Construction fails once nodes would need more bytes than this.
    pub node_memory_budget: usize,
}

impl BuildConfig {
    /// Creates a configuration with the given depth and leaf size limits and
    /// defaults for everything else.
    pub fn new(max_depth: usize, max_leaf_size: usize) -> Self {
        Self {
            max_depth,
            max_leaf_size,
            ..Self::default()
        }
    }

    /// Sets the triangle flag mask.
    pub fn with_flag_mask(mut self, mask: TriangleFlags) -> Self {
        self.flag_mask = mask;
        self
    }

    /// Sets the maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum leaf size.
    pub fn with_max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.max_leaf_size = max_leaf_size;
        self
    }

    /// Sets the split fraction.
    pub fn with_split_fraction(mut self, fraction: Real) -> Self {
        self.split_fraction = fraction;
        self
    }

    /// Sets the node memory budget in bytes.
    pub fn with_node_memory_budget(mut self, bytes: usize) -> Self {
        self.node_memory_budget = bytes;
        self
    }

    /// Checks the parameters that can be rejected before looking at the mesh.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth >= TRAVERSAL_STACK_CAPACITY {
            return Err(BspError::DepthExceedsStack {
                max_depth: self.max_depth,
                capacity: TRAVERSAL_STACK_CAPACITY,
            });
        }
        if !(self.split_fraction > 0.0 && self.split_fraction < 1.0) {
            return Err(BspError::InvalidSplitFraction(self.split_fraction));
        }
        Ok(())
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            flag_mask: TriangleFlags::from_bits_retain(u32::MAX),
            max_depth: 25,
            max_leaf_size: 8,
            split_fraction: DEFAULT_SPLIT_FRACTION,
            node_memory_budget: DEFAULT_NODE_MEMORY_BUDGET,
        }
    }
}
