//! Primitive bounding volumes
//!
//! Axis-aligned boxes, oriented boxes, spheres, planes and triangles, each
//! with point containment and closest-point queries. Pairwise overlap tests
//! live in [`super::intersect`] and ray casts in [`super::raycast`].

use crate::foundation::math::{self, Mat3, MathError, Quat, Vec3};

/// Tolerance for "point lies on the plane" checks
const ON_PLANE_TOLERANCE: f32 = 1e-5;

/// Barycentric coordinates may dip this far below zero and still count as inside
const BARYCENTRIC_TOLERANCE: f32 = 1e-6;

/// Axis-aligned bounding box stored as center and half-widths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Center of the box
    pub origin: Vec3,
    /// Half-widths along X, Y and Z
    pub extents: Vec3,
}

impl Aabb {
    /// Creates a box from its center and half-widths
    pub fn new(origin: Vec3, extents: Vec3) -> Self {
        Self { origin, extents }
    }

    /// Creates a box spanning two corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            origin: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    /// Tightest box around a set of points, `None` if there are no points
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (math::component_min(&min, &p), math::component_max(&max, &p))
        });
        Some(Self::from_min_max(min, max))
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        let p1 = self.origin + self.extents;
        let p2 = self.origin - self.extents;
        math::component_min(&p1, &p2)
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        let p1 = self.origin + self.extents;
        let p2 = self.origin - self.extents;
        math::component_max(&p1, &p2)
    }

    /// The 8 corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let e = self.extents;
        std::array::from_fn(|i| {
            let sign = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
            self.origin + Vec3::new(e.x * sign(1), e.y * sign(2), e.z * sign(4))
        })
    }

    /// Check if a point lies inside the box (faces included)
    pub fn contains(&self, point: Vec3) -> bool {
        let min = self.min();
        let max = self.max();
        (0..3).all(|i| point[i] >= min[i] && point[i] <= max[i])
    }

    /// Point of the box nearest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let min = self.min();
        let max = self.max();
        Vec3::new(
            math::clamp(point.x, min.x, max.x),
            math::clamp(point.y, min.y, max.y),
            math::clamp(point.z, min.z, max.z),
        )
    }

    /// Check if this box overlaps another axis-aligned box (touching counts)
    pub fn intersects_aabb(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        (0..3).all(|i| a_min[i] <= b_max[i] && a_max[i] >= b_min[i])
    }
}

/// Oriented bounding box
///
/// The columns of `orientation` are the box's local X, Y and Z axes and are
/// expected to be orthonormal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// Center of the box
    pub origin: Vec3,
    /// Half-widths along the local axes
    pub extents: Vec3,
    /// Local axes as matrix columns
    pub orientation: Mat3,
}

impl Obb {
    /// Creates an oriented box
    pub fn new(origin: Vec3, extents: Vec3, orientation: Mat3) -> Self {
        Self { origin, extents, orientation }
    }

    /// Oriented box with the same volume as an axis-aligned one
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(aabb.origin, aabb.extents, Mat3::identity())
    }

    /// Oriented box whose local axes are rotated by `rotation`
    pub fn from_rotation(origin: Vec3, extents: Vec3, rotation: Quat) -> Self {
        Self::new(origin, extents, rotation.to_rotation_matrix().into_inner())
    }

    /// Oriented box from three half-axis vectors (matrix columns)
    ///
    /// A skewed basis is orthonormalized in column order; the extents are the
    /// lengths of the orthogonalized half-axes. Zero-length or coplanar
    /// half-axes are rejected.
    pub fn from_basis(origin: Vec3, half_axes: Mat3) -> Result<Self, MathError> {
        let c0 = half_axes.column(0).into_owned();
        let c1 = half_axes.column(1).into_owned();
        let c2 = half_axes.column(2).into_owned();

        let x = c0 * math::safe_div(1.0, c0.magnitude())?;
        math::safe_inverse(&half_axes)?;

        let y_raw = c1 - x * x.dot(&c1);
        let y = y_raw * math::safe_div(1.0, y_raw.magnitude())?;
        let mut z = x.cross(&y);
        if z.dot(&c2) < 0.0 {
            z = -z;
        }

        let extents = Vec3::new(c0.magnitude(), y_raw.magnitude(), z.dot(&c2));
        let orientation = Mat3::from_columns(&[x, y, z]);
        Ok(Self::new(origin, extents, orientation))
    }

    /// Local axis `index` in world space
    ///
    /// # Panics
    ///
    /// Panics if `index` is not 0, 1 or 2.
    pub fn axis(&self, index: usize) -> Vec3 {
        math::axis(&self.orientation, index)
    }

    /// The three local axes in world space
    pub fn axes(&self) -> [Vec3; 3] {
        [self.axis(0), self.axis(1), self.axis(2)]
    }

    /// The 8 corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let [u, v, w] = self.axes();
        let e = self.extents;
        std::array::from_fn(|i| {
            let sign = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
            self.origin + u * (e.x * sign(1)) + v * (e.y * sign(2)) + w * (e.z * sign(4))
        })
    }

    /// Express a world-space point in the box's local frame
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.orientation.transpose() * (point - self.origin)
    }

    /// Check if a point lies inside the box (faces included)
    pub fn contains(&self, point: Vec3) -> bool {
        let dir = point - self.origin;
        self.axes().iter().enumerate().all(|(i, axis)| {
            let distance = dir.dot(axis);
            distance <= self.extents[i] && distance >= -self.extents[i]
        })
    }

    /// Point of the box nearest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let dir = point - self.origin;
        self.axes()
            .iter()
            .enumerate()
            .fold(self.origin, |result, (i, axis)| {
                let distance = math::clamp(dir.dot(axis), -self.extents[i], self.extents[i]);
                result + axis * distance
            })
    }
}

/// A sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere
    pub origin: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    pub fn new(origin: Vec3, radius: f32) -> Self {
        Self { origin, radius }
    }

    /// Check if a point lies inside the sphere (surface included)
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.origin).magnitude_squared() <= self.radius * self.radius
    }

    /// Point on the sphere surface nearest to `point`
    ///
    /// For a query point at the exact center the +X surface point is returned.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let direction = (point - self.origin)
            .try_normalize(math::EPSILON)
            .unwrap_or_else(Vec3::x);
        self.origin + direction * self.radius
    }

    /// Get the penetration depth if intersecting (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &Sphere) -> f32 {
        let distance = (self.origin - other.origin).magnitude();
        let radius_sum = self.radius + other.radius;
        if distance < radius_sum {
            radius_sum - distance
        } else {
            0.0
        }
    }
}

/// Infinite plane `dot(p, normal) == distance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Vec3,
    /// Signed distance from the world origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance (the normal is normalized)
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self {
            normal: normal.try_normalize(math::EPSILON).unwrap_or(normal),
            distance,
        }
    }

    /// Supporting plane of a triangle, facing along its winding normal
    pub fn from_triangle(triangle: &Triangle) -> Self {
        let normal = triangle.normal();
        Self {
            normal,
            distance: normal.dot(&triangle.a),
        }
    }

    /// Signed distance from the plane to a point (positive on the normal side)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        point.dot(&self.normal) - self.distance
    }

    /// Check if a point lies on the plane
    pub fn contains(&self, point: Vec3) -> bool {
        math::approx_equal(point.dot(&self.normal), self.distance, ON_PLANE_TOLERANCE)
    }

    /// Orthogonal projection of `point` onto the plane
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.signed_distance(point)
    }
}

/// A triangle for collision detection
///
/// Winding order determines the face normal: `normalize(cross(b - a, c - a))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub a: Vec3,
    /// Second vertex
    pub b: Vec3,
    /// Third vertex
    pub c: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Creates a triangle from an array of vertices
    pub fn from_points(points: [Vec3; 3]) -> Self {
        let [a, b, c] = points;
        Self { a, b, c }
    }

    /// Creates a triangle from 9 raw scalars (`ax, ay, az, bx, ...`)
    pub fn from_scalars(values: &[f32; 9]) -> Self {
        Self {
            a: Vec3::new(values[0], values[1], values[2]),
            b: Vec3::new(values[3], values[4], values[5]),
            c: Vec3::new(values[6], values[7], values[8]),
        }
    }

    /// The vertices as an indexable array
    pub fn points(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    /// The vertices as 9 raw scalars
    pub fn to_scalars(&self) -> [f32; 9] {
        [
            self.a.x, self.a.y, self.a.z,
            self.b.x, self.b.y, self.b.z,
            self.c.x, self.c.y, self.c.z,
        ]
    }

    /// Edges `b - a`, `c - b` and `a - c`
    pub fn edges(&self) -> [Vec3; 3] {
        [self.b - self.a, self.c - self.b, self.a - self.c]
    }

    /// Unnormalized face normal; zero for a degenerate triangle
    pub(crate) fn area_normal(&self) -> Vec3 {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// Calculates the unit normal of the triangle (right-hand rule)
    ///
    /// Degenerate triangles return the zero vector.
    pub fn normal(&self) -> Vec3 {
        self.area_normal()
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::zeros)
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Barycentric coordinates `(u, v, w)` of `point` projected onto the
    /// triangle's plane, so that `u*a + v*b + w*c` is that projection
    ///
    /// Returns `None` for a zero-area triangle.
    pub fn barycentric(&self, point: Vec3) -> Option<Vec3> {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = point - self.a;

        let d00 = ab.dot(&ab);
        let d01 = ab.dot(&ac);
        let d11 = ac.dot(&ac);
        let d20 = ap.dot(&ab);
        let d21 = ap.dot(&ac);

        let denom = d00 * d11 - d01 * d01;
        if denom.abs() <= f32::EPSILON * d00 * d11 {
            return None;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Some(Vec3::new(1.0 - v - w, v, w))
    }

    /// Check if a point lies on the triangle (edges included)
    pub fn contains(&self, point: Vec3) -> bool {
        let Some(bary) = self.barycentric(point) else {
            return false;
        };
        if bary.iter().any(|&coord| coord < -BARYCENTRIC_TOLERANCE) {
            return false;
        }
        Plane::from_triangle(self).contains(point)
    }

    /// Distance from a point to the triangle plane (signed)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal().dot(&(point - self.a))
    }

    /// Get the closest point on the triangle to a given point
    ///
    /// Classifies `point` into the vertex, edge or face region of the triangle.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let ab = self.b - self.a;
        let ac = self.c - self.a;

        // Vertex region outside a
        let ap = point - self.a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.a;
        }

        // Vertex region outside b
        let bp = point - self.b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return self.b;
        }

        // Edge region ab
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.a + ab * v;
        }

        // Vertex region outside c
        let cp = point - self.c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return self.c;
        }

        // Edge region ac
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.a + ac * w;
        }

        // Edge region bc
        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.b + (self.c - self.b) * w;
        }

        // Face region
        let denom = va + vb + vc;
        if denom == 0.0 {
            return self.a;
        }
        let v = vb / denom;
        let w = vc / denom;
        self.a + ab * v + ac * w
    }
}

impl std::ops::Index<usize> for Triangle {
    type Output = Vec3;

    fn index(&self, index: usize) -> &Vec3 {
        match index {
            0 => &self.a,
            1 => &self.b,
            2 => &self.c,
            _ => panic!("triangle vertex index {index} out of range (expected < 3)"),
        }
    }
}
