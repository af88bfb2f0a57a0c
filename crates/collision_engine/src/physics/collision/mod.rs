//! Collision detection between primitives, rays and triangle meshes
//!
//! # Module Organization
//!
//! - [`primitives`] - Bounding volumes: boxes, spheres, planes, triangles
//! - [`sat`] - Separating axis tests for box and triangle pairings
//! - [`intersect`] - Pairwise overlap for every primitive pair
//! - [`raycast`] - Rays and per-shape ray casts
//! - [`mesh`] - Triangle meshes with optional octree acceleration
//!
//! # Key Types
//!
//! - [`Intersects`] - Overlap test, implemented for every ordered pair
//! - [`Raycast`] - Ray cast, implemented for every primitive and [`Mesh`]
//! - [`Mesh`] - Flat triangle buffer queried by shape or by ray

pub mod primitives;
pub mod sat;
pub mod intersect;
pub mod raycast;
pub mod mesh;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use primitives::{Aabb, Obb, Plane, Sphere, Triangle};
pub use sat::{Interval, Project};
pub use intersect::Intersects;
pub use raycast::{Ray, RaycastHit, Raycast, NO_HIT};
pub use mesh::{Mesh, MeshError};
