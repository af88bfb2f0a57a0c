//! # Collision Engine
//!
//! Geometric collision detection in 3D.
//!
//! ## Features
//!
//! - **Primitives**: axis-aligned and oriented boxes, spheres, planes, triangles
//! - **Overlap Tests**: every primitive pair, via separating axes where it applies
//! - **Ray Casting**: hit point, surface normal and distance for every shape
//! - **Meshes**: triangle soups with an optional octree accelerator
//! - **Configuration**: TOML or RON files for acceleration settings
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_engine::prelude::*;
//!
//! let floor = Triangle::new(
//!     Vec3::new(-5.0, 0.0, -5.0),
//!     Vec3::new(0.0, 0.0, 5.0),
//!     Vec3::new(5.0, 0.0, -5.0),
//! );
//! let mut mesh = Mesh::from_triangles([floor]);
//! mesh.accelerate();
//!
//! let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), -Vec3::y());
//! let hit = ray.cast(&mesh);
//! assert!(hit.hit);
//! assert!((hit.distance - 3.0).abs() < 1e-5);
//!
//! assert!(mesh.intersects(&Sphere::new(Vec3::new(0.0, 0.5, 0.0), 1.0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::many_single_char_names)]

pub mod foundation;
pub mod config;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config},
        foundation::math::{Mat3, Quat, Vec3},
        physics::collision::{
            Aabb, Intersects, Mesh, MeshError, Obb, Plane, Ray, Raycast, RaycastHit, Sphere,
            Triangle, NO_HIT,
        },
        spatial::BvhNode,
    };
}
