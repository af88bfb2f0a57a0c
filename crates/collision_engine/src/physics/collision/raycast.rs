//! Ray casting against primitives
//!
//! Every primitive implements [`Raycast`]. A cast either produces a
//! [`RaycastHit`] (hit point, outward surface normal, distance along the ray)
//! or nothing; [`Ray::cast`] and [`Ray::cast_against`] flatten that into a hit
//! record with `hit == false` or the sentinel distance [`NO_HIT`].

use crate::foundation::math::{self, Vec3};
use super::primitives::{Aabb, Obb, Plane, Sphere, Triangle};

/// Distance reported by [`Ray::cast_against`] when nothing was hit
pub const NO_HIT: f32 = -1.0;

/// Slack allowed on barycentric coordinates of a triangle hit
const BARYCENTRIC_TOLERANCE: f32 = 1e-5;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The unit direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    ///
    /// The direction is normalized; a zero direction is replaced with +X.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.try_normalize(f32::EPSILON).unwrap_or_else(|| {
            log::debug!("degenerate ray direction {direction:?}, using +X");
            Vec3::x()
        });
        Self { origin, direction }
    }

    /// Ray starting at `from` and pointing towards `to`
    pub fn from_points(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Check if a point lies on the ray
    pub fn contains(&self, point: Vec3) -> bool {
        let Some(to_point) = (point - self.origin).try_normalize(f32::EPSILON) else {
            return true;
        };
        math::approx_equal(to_point.dot(&self.direction), 1.0, 1e-6)
    }

    /// Point on the ray nearest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let t = (point - self.origin).dot(&self.direction).max(0.0);
        self.point_at(t)
    }

    /// Cast against a shape, returning a hit record
    ///
    /// When nothing is hit the record has `hit == false` and default fields.
    pub fn cast<S: Raycast + ?Sized>(&self, shape: &S) -> RaycastHit {
        shape.raycast(self).unwrap_or_default()
    }

    /// Cast against a shape, returning the hit distance or [`NO_HIT`]
    pub fn cast_against<S: Raycast + ?Sized>(&self, shape: &S) -> f32 {
        shape.raycast(self).map_or(NO_HIT, |hit| hit.distance)
    }
}

/// Result of a ray intersection test
///
/// Fields other than `hit` are only meaningful when `hit` is true.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The point of intersection in world space
    pub point: Vec3,
    /// The outward surface normal at the intersection point
    pub normal: Vec3,
    /// The distance from the ray origin to the hit point
    pub distance: f32,
    /// Whether anything was hit
    pub hit: bool,
}

impl RaycastHit {
    /// Hit at `distance` along `ray` with the given surface normal
    pub fn new(ray: &Ray, distance: f32, normal: Vec3) -> Self {
        Self {
            point: ray.point_at(distance),
            normal,
            distance,
            hit: true,
        }
    }
}

impl Default for RaycastHit {
    fn default() -> Self {
        Self {
            point: Vec3::zeros(),
            normal: Vec3::z(),
            distance: 0.0,
            hit: false,
        }
    }
}

/// Shapes a ray can be cast against
pub trait Raycast {
    /// First hit of `ray` on the shape at a non-negative distance
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit>;
}

/// Slab test against a box with center `center`, unit `axes` and half-widths
/// `extents`; returns the accepted distance and the normal of the face hit
fn slab_cast(ray: &Ray, center: &Vec3, axes: &[Vec3; 3], extents: &Vec3) -> Option<(f32, Vec3)> {
    let offset = center - ray.origin;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut min_normal = Vec3::zeros();
    let mut max_normal = Vec3::zeros();

    for (i, axis) in axes.iter().enumerate() {
        let e = axis.dot(&offset);
        let f = axis.dot(&ray.direction);
        let extent = extents[i].abs();

        if f.abs() < f32::EPSILON {
            // Parallel to this slab: miss unless the origin lies between its faces
            if -e - extent > 0.0 || -e + extent < 0.0 {
                return None;
            }
            continue;
        }

        let t_pos = (e + extent) / f;
        let t_neg = (e - extent) / f;
        let (near, near_normal, far, far_normal) = if t_pos < t_neg {
            (t_pos, *axis, t_neg, -axis)
        } else {
            (t_neg, -axis, t_pos, *axis)
        };

        if near > t_min {
            t_min = near;
            min_normal = near_normal;
        }
        if far < t_max {
            t_max = far;
            max_normal = far_normal;
        }
    }

    if t_max < 0.0 || t_min > t_max {
        return None;
    }

    if t_min >= 0.0 {
        Some((t_min, min_normal))
    } else {
        Some((t_max, max_normal))
    }
}

impl Raycast for Aabb {
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let axes = [Vec3::x(), Vec3::y(), Vec3::z()];
        let (t, normal) = slab_cast(ray, &self.origin, &axes, &self.extents)?;
        Some(RaycastHit::new(ray, t, normal))
    }
}

impl Raycast for Obb {
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let (t, normal) = slab_cast(ray, &self.origin, &self.axes(), &self.extents)?;
        Some(RaycastHit::new(ray, t, normal))
    }
}

impl Raycast for Sphere {
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let e = self.origin - ray.origin;
        let r_sq = self.radius * self.radius;
        let e_sq = e.magnitude_squared();

        let a = e.dot(&ray.direction);
        let b_sq = e_sq - a * a;
        let discriminant = r_sq - b_sq;
        if discriminant < 0.0 {
            return None;
        }

        let f = discriminant.sqrt();
        // From inside the sphere only the far root lies ahead
        let t = if e_sq < r_sq { a + f } else { a - f };
        if t < 0.0 {
            return None;
        }

        let point = ray.point_at(t);
        let normal = (point - self.origin)
            .try_normalize(f32::EPSILON)
            .unwrap_or(-ray.direction);
        Some(RaycastHit { point, normal, distance: t, hit: true })
    }
}

impl Raycast for Plane {
    /// Only rays travelling against the normal can hit the plane
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let nd = ray.direction.dot(&self.normal);
        if nd >= 0.0 {
            return None;
        }

        let pn = ray.origin.dot(&self.normal);
        let t = (self.distance - pn) / nd;
        (t >= 0.0).then(|| RaycastHit::new(ray, t, self.normal))
    }
}

impl Raycast for Triangle {
    /// Front faces only: the supporting plane faces along the winding normal
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let plane = Plane::from_triangle(self);
        let hit = plane.raycast(ray)?;

        let bary = self.barycentric(hit.point)?;
        let inside = bary
            .iter()
            .all(|&c| c >= -BARYCENTRIC_TOLERANCE && c <= 1.0 + BARYCENTRIC_TOLERANCE);
        let sums_to_one = (bary.sum() - 1.0).abs() <= BARYCENTRIC_TOLERANCE;

        (inside && sums_to_one).then_some(hit)
    }
}
