//! Separating Axis Theorem tests
//!
//! Two convex shapes are disjoint iff some axis exists on which their
//! projections do not overlap. Each pairing below enumerates its candidate
//! axes and stops at the first separating one. Interval comparisons are
//! inclusive, so shapes that merely touch are reported as overlapping.

use crate::foundation::math::Vec3;
use super::primitives::{Aabb, Obb, Triangle};

/// Squared sine of the angle below which two edges count as parallel
const PARALLEL_SIN_SQ: f32 = 1e-10;

/// Projection of a shape onto an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Smallest projected value
    pub min: f32,
    /// Largest projected value
    pub max: f32,
}

impl Interval {
    /// Projection of a point set onto `axis`
    pub fn from_points(points: &[Vec3], axis: &Vec3) -> Self {
        points.iter().fold(
            Self { min: f32::INFINITY, max: f32::NEG_INFINITY },
            |interval, point| {
                let projection = axis.dot(point);
                Self {
                    min: interval.min.min(projection),
                    max: interval.max.max(projection),
                }
            },
        )
    }

    /// Projection of `shape` onto `axis`
    pub fn get<S: Project + ?Sized>(shape: &S, axis: &Vec3) -> Self {
        shape.project(axis)
    }

    /// True if the two intervals share at least one value
    pub fn overlaps(&self, other: &Interval) -> bool {
        other.min <= self.max && self.min <= other.max
    }
}

/// Shapes that can be projected onto an axis
pub trait Project {
    /// Interval covered by the shape along `axis`
    fn project(&self, axis: &Vec3) -> Interval;
}

impl Project for Aabb {
    fn project(&self, axis: &Vec3) -> Interval {
        Interval::from_points(&self.corners(), axis)
    }
}

impl Project for Obb {
    fn project(&self, axis: &Vec3) -> Interval {
        Interval::from_points(&self.corners(), axis)
    }
}

impl Project for Triangle {
    fn project(&self, axis: &Vec3) -> Interval {
        Interval::from_points(&self.points(), axis)
    }
}

/// True if `a` and `b` overlap when projected onto `axis`
pub fn overlap_on_axis<A, B>(a: &A, b: &B, axis: &Vec3) -> bool
where
    A: Project + ?Sized,
    B: Project + ?Sized,
{
    a.project(axis).overlaps(&b.project(axis))
}

/// True if no axis in `axes` separates `a` from `b`
fn overlap_on_all<A, B>(a: &A, b: &B, axes: &[Vec3]) -> bool
where
    A: Project + ?Sized,
    B: Project + ?Sized,
{
    axes.iter().all(|axis| overlap_on_axis(a, b, axis))
}

/// Face axes of both boxes plus the 9 pairwise cross products
fn box_box_axes(a: [Vec3; 3], b: [Vec3; 3]) -> [Vec3; 15] {
    let mut axes = [Vec3::zeros(); 15];
    axes[..3].copy_from_slice(&a);
    axes[3..6].copy_from_slice(&b);
    for i in 0..3 {
        for j in 0..3 {
            axes[6 + i * 3 + j] = a[i].cross(&b[j]);
        }
    }
    axes
}

/// Triangle normal, box face normals and the 9 box-axis/edge cross products
fn triangle_box_axes(triangle: &Triangle, box_axes: [Vec3; 3]) -> [Vec3; 13] {
    let edges = triangle.edges();
    let mut axes = [Vec3::zeros(); 13];
    axes[0] = triangle.area_normal();
    axes[1..4].copy_from_slice(&box_axes);
    for i in 0..3 {
        for j in 0..3 {
            axes[4 + i * 3 + j] = box_axes[i].cross(&edges[j]);
        }
    }
    axes
}

fn world_axes() -> [Vec3; 3] {
    [Vec3::x(), Vec3::y(), Vec3::z()]
}

/// Axis-aligned box against oriented box (15 axes)
pub fn aabb_obb(aabb: &Aabb, obb: &Obb) -> bool {
    overlap_on_all(aabb, obb, &box_box_axes(world_axes(), obb.axes()))
}

/// Oriented box against oriented box (15 axes)
pub fn obb_obb(a: &Obb, b: &Obb) -> bool {
    overlap_on_all(a, b, &box_box_axes(a.axes(), b.axes()))
}

/// Triangle against axis-aligned box (13 axes)
pub fn triangle_aabb(triangle: &Triangle, aabb: &Aabb) -> bool {
    overlap_on_all(triangle, aabb, &triangle_box_axes(triangle, world_axes()))
}

/// Triangle against oriented box (13 axes)
pub fn triangle_obb(triangle: &Triangle, obb: &Obb) -> bool {
    overlap_on_all(triangle, obb, &triangle_box_axes(triangle, obb.axes()))
}

/// Separating axis candidate for the edge pair `(a, b)` x `(c, d)`
///
/// Parallel edges have a vanishing cross product; in that case the axis is
/// rebuilt perpendicular to the first edge, inside the plane spanned by it
/// and the offset `c - a`. Returns `None` if that is degenerate too.
///
/// Both cutoffs compare against the lengths of the vectors crossed, so the
/// result does not depend on the scale of the triangles.
fn edge_cross_axis(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Option<Vec3> {
    let ab = b - a;
    let cd = d - c;
    let ab_sq = ab.magnitude_squared();

    let axis = ab.cross(&cd);
    if is_significant(&axis, ab_sq * cd.magnitude_squared()) {
        return Some(axis);
    }

    let ac = c - a;
    let support = ab.cross(&ac);
    if !is_significant(&support, ab_sq * ac.magnitude_squared()) {
        return None;
    }
    let axis = ab.cross(&support);
    is_significant(&axis, ab_sq * support.magnitude_squared()).then_some(axis)
}

/// True if the cross product `axis` of two vectors whose squared lengths
/// multiply to `length_product_sq` is not degenerate
fn is_significant(axis: &Vec3, length_product_sq: f32) -> bool {
    let axis_sq = axis.magnitude_squared();
    axis_sq > 0.0 && axis_sq > PARALLEL_SIN_SQ * length_product_sq
}

/// Triangle against triangle (11 axes)
///
/// Degenerate edge-pair axes are skipped and never report a separation.
pub fn triangle_triangle(t1: &Triangle, t2: &Triangle) -> bool {
    let faces = [t1.area_normal(), t2.area_normal()];
    if !overlap_on_all(t1, t2, &faces) {
        return false;
    }

    let p1 = t1.points();
    let p2 = t2.points();
    for i in 0..3 {
        for j in 0..3 {
            let axis = edge_cross_axis(p1[i], p1[(i + 1) % 3], p2[j], p2[(j + 1) % 3]);
            if let Some(axis) = axis {
                if !overlap_on_axis(t1, t2, &axis) {
                    return false;
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use std::f32::consts::FRAC_PI_4;

    fn unit_aabb(origin: Vec3) -> Aabb {
        Aabb::new(origin, Vec3::new(1.0, 1.0, 1.0))
    }

    fn rotated_obb(origin: Vec3) -> Obb {
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), FRAC_PI_4);
        Obb::from_rotation(origin, Vec3::new(1.0, 1.0, 1.0), rotation)
    }

    #[test]
    fn test_interval_projection() {
        let interval = Interval::get(&unit_aabb(Vec3::new(2.0, 0.0, 0.0)), &Vec3::x());
        assert_eq!(interval, Interval { min: 1.0, max: 3.0 });

        let tri = Triangle::new(Vec3::zeros(), Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let interval = Interval::get(&tri, &Vec3::y());
        assert_eq!(interval, Interval { min: -1.0, max: 4.0 });
    }

    #[test]
    fn test_interval_overlap_is_inclusive() {
        let a = Interval { min: 0.0, max: 1.0 };
        assert!(a.overlaps(&Interval { min: 1.0, max: 2.0 }));
        assert!(!a.overlaps(&Interval { min: 1.001, max: 2.0 }));
        assert!(a.overlaps(&Interval { min: -5.0, max: 5.0 }));
    }

    #[test]
    fn test_aabb_obb() {
        let aabb = unit_aabb(Vec3::zeros());
        // Rotated box reaches sqrt(2) along X
        assert!(aabb_obb(&aabb, &rotated_obb(Vec3::new(2.3, 0.0, 0.0))));
        assert!(!aabb_obb(&aabb, &rotated_obb(Vec3::new(2.5, 0.0, 0.0))));
        // Corner-to-corner along the XY diagonal, separated only on a rotated axis
        assert!(!aabb_obb(&aabb, &rotated_obb(Vec3::new(2.3, 2.3, 0.0))));
    }

    #[test]
    fn test_obb_obb() {
        let a = rotated_obb(Vec3::zeros());
        assert!(obb_obb(&a, &rotated_obb(Vec3::new(2.0, 0.0, 0.0))));
        assert!(!obb_obb(&a, &rotated_obb(Vec3::new(0.0, 0.0, 2.5))));

        // Same-orientation boxes separated along their shared diagonal axis
        let offset = Vec3::new(1.0, 1.0, 0.0).normalize() * 2.01;
        assert!(!obb_obb(&a, &rotated_obb(offset)));
    }

    #[test]
    fn test_triangle_aabb() {
        let aabb = unit_aabb(Vec3::zeros());
        let crossing = Triangle::new(
            Vec3::new(-3.0, -3.0, 0.0),
            Vec3::new(3.0, -3.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
        );
        assert!(triangle_aabb(&crossing, &aabb));

        let above = Triangle::new(
            Vec3::new(-3.0, -3.0, 1.5),
            Vec3::new(3.0, -3.0, 1.5),
            Vec3::new(0.0, 3.0, 1.5),
        );
        assert!(!triangle_aabb(&above, &aabb));

        // Near a corner, separated only by the face normal of a tilted triangle
        let tilted = Triangle::new(
            Vec3::new(3.3, 0.0, 0.0),
            Vec3::new(0.0, 3.3, 0.0),
            Vec3::new(0.0, 0.0, 3.3),
        );
        assert!(!triangle_aabb(&tilted, &aabb));
        let closer = Triangle::new(
            Vec3::new(2.5, 0.0, 0.0),
            Vec3::new(0.0, 2.5, 0.0),
            Vec3::new(0.0, 0.0, 2.5),
        );
        assert!(triangle_aabb(&closer, &aabb));
    }

    #[test]
    fn test_triangle_obb() {
        let obb = rotated_obb(Vec3::zeros());
        let tri = Triangle::new(
            Vec3::new(1.3, -0.5, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(1.3, 0.5, 0.0),
        );
        assert!(triangle_obb(&tri, &obb));

        let far = Triangle::new(
            Vec3::new(1.5, -0.5, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(1.5, 0.5, 0.0),
        );
        assert!(!triangle_obb(&far, &obb));
    }

    #[test]
    fn test_triangle_triangle_crossing() {
        let t1 = Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let t2 = Triangle::new(
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 2.0, 0.0),
        );
        assert!(triangle_triangle(&t1, &t2));
        assert!(triangle_triangle(&t2, &t1));

        let lifted = Triangle::new(
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::new(0.0, 0.0, 1.5),
            Vec3::new(0.0, 2.0, 1.0),
        );
        assert!(!triangle_triangle(&t1, &lifted));
    }

    #[test]
    fn test_coplanar_triangles_use_fallback_axes() {
        let t1 = Triangle::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        // Same plane, parallel hypotenuse, shifted past it
        let t2 = Triangle::new(
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.6, 1.0, 0.0),
            Vec3::new(1.0, 0.6, 0.0),
        );
        assert!(!triangle_triangle(&t1, &t2));

        let overlapping = Triangle::new(
            Vec3::new(0.2, 0.2, 0.0),
            Vec3::new(2.0, 0.2, 0.0),
            Vec3::new(0.2, 2.0, 0.0),
        );
        assert!(triangle_triangle(&t1, &overlapping));
    }

    #[test]
    fn test_edge_cross_axis_degenerate() {
        // Collinear edges: both the cross product and the fallback vanish
        let axis = edge_cross_axis(Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0, Vec3::x() * 3.0);
        assert!(axis.is_none());

        let axis = edge_cross_axis(Vec3::zeros(), Vec3::x(), Vec3::y(), Vec3::y() + Vec3::x());
        let axis = axis.unwrap();
        assert_eq!(axis.dot(&Vec3::x()), 0.0);
    }

    #[test]
    fn test_edge_axis_separation_is_scale_independent() {
        for scale in [1000.0, 1.0, 0.01, 3e-4, 1e-5] {
            let flat = Triangle::new(
                Vec3::zeros(),
                Vec3::new(scale, 0.0, 0.0),
                Vec3::new(0.0, scale, 0.0),
            );
            // Only the edge-pair axis (1, 1, 0) separates these
            let beside = Triangle::new(
                Vec3::new(0.6, 0.6, -1.0) * scale,
                Vec3::new(0.6, 0.6, 1.0) * scale,
                Vec3::new(2.0, 2.0, 0.0) * scale,
            );
            let piercing = Triangle::new(
                Vec3::new(0.3, 0.3, -1.0) * scale,
                Vec3::new(0.3, 0.3, 1.0) * scale,
                Vec3::new(2.0, 2.0, 0.0) * scale,
            );

            assert!(!triangle_triangle(&flat, &beside), "scale {scale}");
            assert!(!triangle_triangle(&beside, &flat), "scale {scale}");
            assert!(triangle_triangle(&flat, &piercing), "scale {scale}");
        }
    }
}
