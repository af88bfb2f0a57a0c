//! Pairwise overlap tests between primitives
//!
//! Every ordered pair of primitives implements [`Intersects`]; the reversed
//! pair always gives the same answer. Box/box and triangle/box/triangle
//! pairings go through the SAT engine in [`super::sat`], the rest use
//! closest-point or plane-distance tests. Touching shapes intersect.

use super::primitives::{Aabb, Obb, Plane, Sphere, Triangle};
use super::sat;
use crate::foundation::math::{self, Vec3};

/// Squared sine of the angle below which two plane normals count as parallel
/// (about 1e-6 rad)
const PARALLEL_SIN_SQ: f32 = 1e-12;

/// Overlap test against another shape
pub trait Intersects<Rhs: ?Sized = Self> {
    /// True if the two shapes share at least one point
    fn intersects(&self, other: &Rhs) -> bool;
}

/// Implements `B: Intersects<A>` by delegating to `A: Intersects<B>`
macro_rules! impl_reversed {
    ($($a:ty => $b:ty),* $(,)?) => {
        $(
            impl Intersects<$a> for $b {
                fn intersects(&self, other: &$a) -> bool {
                    other.intersects(self)
                }
            }
        )*
    };
}

/// Distance from `point` to `closest` compared against `radius`
fn within_radius(point: Vec3, closest: Vec3, radius: f32) -> bool {
    (point - closest).magnitude_squared() <= radius * radius
}

/// Half-length of a box projected onto `normal`
fn projected_radius(extents: &Vec3, axes: &[Vec3; 3], normal: &Vec3) -> f32 {
    (0..3).map(|i| extents[i].abs() * normal.dot(&axes[i]).abs()).sum()
}

// Sphere

impl Intersects for Sphere {
    fn intersects(&self, other: &Sphere) -> bool {
        let distance_squared = (self.origin - other.origin).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }
}

impl Intersects<Aabb> for Sphere {
    fn intersects(&self, other: &Aabb) -> bool {
        within_radius(self.origin, other.closest_point(self.origin), self.radius)
    }
}

impl Intersects<Obb> for Sphere {
    fn intersects(&self, other: &Obb) -> bool {
        within_radius(self.origin, other.closest_point(self.origin), self.radius)
    }
}

impl Intersects<Plane> for Sphere {
    fn intersects(&self, other: &Plane) -> bool {
        within_radius(self.origin, other.closest_point(self.origin), self.radius)
    }
}

impl Intersects<Triangle> for Sphere {
    fn intersects(&self, other: &Triangle) -> bool {
        within_radius(self.origin, other.closest_point(self.origin), self.radius)
    }
}

// Aabb

impl Intersects for Aabb {
    fn intersects(&self, other: &Aabb) -> bool {
        self.intersects_aabb(other)
    }
}

impl Intersects<Obb> for Aabb {
    fn intersects(&self, other: &Obb) -> bool {
        sat::aabb_obb(self, other)
    }
}

impl Intersects<Plane> for Aabb {
    fn intersects(&self, other: &Plane) -> bool {
        let axes = [Vec3::x(), Vec3::y(), Vec3::z()];
        let radius = projected_radius(&self.extents, &axes, &other.normal);
        other.signed_distance(self.origin).abs() <= radius
    }
}

impl Intersects<Triangle> for Aabb {
    fn intersects(&self, other: &Triangle) -> bool {
        sat::triangle_aabb(other, self)
    }
}

// Obb

impl Intersects for Obb {
    fn intersects(&self, other: &Obb) -> bool {
        sat::obb_obb(self, other)
    }
}

impl Intersects<Plane> for Obb {
    fn intersects(&self, other: &Plane) -> bool {
        let radius = projected_radius(&self.extents, &self.axes(), &other.normal);
        other.signed_distance(self.origin).abs() <= radius
    }
}

impl Intersects<Triangle> for Obb {
    fn intersects(&self, other: &Triangle) -> bool {
        sat::triangle_obb(other, self)
    }
}

// Plane

impl Intersects for Plane {
    /// Planes intersect unless they are parallel and distinct
    fn intersects(&self, other: &Plane) -> bool {
        let direction = self.normal.cross(&other.normal);
        if direction.magnitude_squared() > PARALLEL_SIN_SQ {
            return true;
        }
        // Parallel: only coincident planes share points
        let facing = self.normal.dot(&other.normal).signum();
        math::approx_equal(self.distance, other.distance * facing, math::EPSILON)
    }
}

impl Intersects<Triangle> for Plane {
    fn intersects(&self, other: &Triangle) -> bool {
        let sides = other.points().map(|p| self.signed_distance(p));
        let all_above = sides.iter().all(|&d| d > 0.0);
        let all_below = sides.iter().all(|&d| d < 0.0);
        !(all_above || all_below)
    }
}

// Triangle

impl Intersects for Triangle {
    fn intersects(&self, other: &Triangle) -> bool {
        sat::triangle_triangle(self, other)
    }
}

impl_reversed!(
    Sphere => Aabb,
    Sphere => Obb,
    Sphere => Plane,
    Sphere => Triangle,
    Aabb => Obb,
    Aabb => Plane,
    Aabb => Triangle,
    Obb => Plane,
    Obb => Triangle,
    Plane => Triangle,
);
