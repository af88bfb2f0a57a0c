//! Spatial partitioning data structures
//!
//! Provides the octree used to accelerate ray casts and shape queries
//! against triangle meshes.

mod bvh;

pub use bvh::{octant_bounds, BvhKind, BvhNode, OCTANTS};
