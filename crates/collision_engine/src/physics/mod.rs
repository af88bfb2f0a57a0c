//! Physics module for collision detection
//!
//! Narrow-phase tests between primitives and meshes live in [`collision`];
//! the octree that accelerates mesh queries lives in [`crate::spatial`].

pub mod collision;

pub use collision::{
    Aabb,
    Intersects,
    Mesh,
    Obb,
    Plane,
    Ray,
    Raycast,
    RaycastHit,
    Sphere,
    Triangle,
};
