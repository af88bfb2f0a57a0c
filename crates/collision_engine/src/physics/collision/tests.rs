//! Cross-module properties of the collision queries

use super::*;
use crate::foundation::math::{Quat, Vec3};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_vec(rng: &mut StdRng, range: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-range..range),
        rng.gen_range(-range..range),
        rng.gen_range(-range..range),
    )
}

fn random_rotation(rng: &mut StdRng) -> Quat {
    Quat::from_euler_angles(
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-3.0..3.0),
    )
}

fn random_extents(rng: &mut StdRng) -> Vec3 {
    Vec3::new(
        rng.gen_range(0.1..1.5),
        rng.gen_range(0.1..1.5),
        rng.gen_range(0.1..1.5),
    )
}

struct Shapes {
    sphere: Sphere,
    aabb: Aabb,
    obb: Obb,
    plane: Plane,
    triangle: Triangle,
}

impl Shapes {
    fn random(rng: &mut StdRng, spread: f32) -> Self {
        let sphere = Sphere::new(random_vec(rng, spread), rng.gen_range(0.1..1.5));
        let aabb = Aabb::new(random_vec(rng, spread), random_extents(rng));
        let obb = Obb::from_rotation(random_vec(rng, spread), random_extents(rng), random_rotation(rng));
        let normal = random_vec(rng, 1.0) + Vec3::new(0.0, 0.05, 0.0);
        let plane = Plane::new(normal, rng.gen_range(-spread..spread));
        let center = random_vec(rng, spread);
        let triangle = Triangle::new(
            center + random_vec(rng, 1.5),
            center + random_vec(rng, 1.5),
            center + random_vec(rng, 1.5),
        );
        Self { sphere, aabb, obb, plane, triangle }
    }
}

fn assert_symmetric<A, B>(a: &A, b: &B)
where
    A: Intersects<B> + std::fmt::Debug,
    B: Intersects<A> + std::fmt::Debug,
{
    assert_eq!(a.intersects(b), b.intersects(a), "{a:?} vs {b:?}");
}

#[test]
fn test_intersection_is_symmetric_for_every_pair() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut overlaps = 0;

    for _ in 0..300 {
        let x = Shapes::random(&mut rng, 2.0);
        let y = Shapes::random(&mut rng, 2.0);

        assert_symmetric(&x.sphere, &y.sphere);
        assert_symmetric(&x.sphere, &y.aabb);
        assert_symmetric(&x.sphere, &y.obb);
        assert_symmetric(&x.sphere, &y.plane);
        assert_symmetric(&x.sphere, &y.triangle);
        assert_symmetric(&x.aabb, &y.aabb);
        assert_symmetric(&x.aabb, &y.obb);
        assert_symmetric(&x.aabb, &y.plane);
        assert_symmetric(&x.aabb, &y.triangle);
        assert_symmetric(&x.obb, &y.obb);
        assert_symmetric(&x.obb, &y.plane);
        assert_symmetric(&x.obb, &y.triangle);
        assert_symmetric(&x.plane, &y.plane);
        assert_symmetric(&x.plane, &y.triangle);
        assert_symmetric(&x.triangle, &y.triangle);

        if x.obb.intersects(&y.triangle) {
            overlaps += 1;
        }
    }

    // The battery exercises both outcomes
    assert!(overlaps > 0 && overlaps < 300);
}

#[test]
fn test_boxes_touching_and_separated() {
    let a = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
    let touching = Aabb::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
    let apart = Aabb::new(Vec3::new(2.001, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));

    assert!(a.intersects(&touching));
    assert!(!a.intersects(&apart));

    // The same pair seen through the oriented box path
    assert!(a.intersects(&Obb::from_aabb(&touching)));
    assert!(!a.intersects(&Obb::from_aabb(&apart)));
    assert!(Obb::from_aabb(&a).intersects(&Obb::from_aabb(&touching)));
    assert!(!Obb::from_aabb(&a).intersects(&Obb::from_aabb(&apart)));
}

#[test]
fn test_gap_along_known_axis_separates() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let a = Aabb::new(random_vec(&mut rng, 3.0), random_extents(&mut rng));
        let b_extents = random_extents(&mut rng);
        let gap = rng.gen_range(0.01..1.0);
        let offset = a.extents.x + b_extents.x + gap;
        let b = Aabb::new(a.origin + Vec3::new(offset, 0.0, 0.0), b_extents);

        assert!(!a.intersects(&b));
        assert!(!sat::aabb_obb(&a, &Obb::from_aabb(&b)));
    }
}

#[test]
fn test_barycentric_of_vertex_and_centroid() {
    let tri = Triangle::new(
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    );

    let at_a = tri.barycentric(tri.a).unwrap();
    assert_abs_diff_eq!(at_a, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);

    let at_centroid = tri.barycentric(tri.centroid()).unwrap();
    let third = 1.0 / 3.0;
    assert_abs_diff_eq!(at_centroid, Vec3::new(third, third, third), epsilon = 1e-6);
}

#[test]
fn test_barycentric_reconstructs_point() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..200 {
        let tri = Triangle::new(
            random_vec(&mut rng, 1.0),
            random_vec(&mut rng, 1.0),
            random_vec(&mut rng, 1.0),
        );
        if tri.area_normal().magnitude() < 0.5 {
            continue;
        }

        let weights = Vec3::new(rng.gen_range(-0.5..1.5), rng.gen_range(-0.5..1.5), 0.0);
        let point = tri.a + (tri.b - tri.a) * weights.x + (tri.c - tri.a) * weights.y;

        let bary = tri.barycentric(point).unwrap();
        let rebuilt = tri.a * bary.x + tri.b * bary.y + tri.c * bary.z;
        assert_relative_eq!(bary.sum(), 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(rebuilt, point, epsilon = 1e-3);
    }
}

#[test]
fn test_ray_sphere_round_trip() {
    let mut rng = StdRng::seed_from_u64(5);
    let sphere = Sphere::new(Vec3::zeros(), 1.0);

    for _ in 0..100 {
        let mut origin = random_vec(&mut rng, 10.0);
        if origin.magnitude() < 1.5 {
            origin += Vec3::new(3.0, 0.0, 0.0);
        }
        let ray = Ray::new(origin, -origin);
        let hit = ray.cast(&sphere);

        assert!(hit.hit);
        assert_relative_eq!(hit.distance, origin.magnitude() - sphere.radius, epsilon = 1e-3);
        assert_relative_eq!(hit.point.magnitude(), sphere.radius, epsilon = 1e-3);
    }
}

#[test]
fn test_ray_pointing_away_never_hits_plane() {
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..200 {
        let plane = Plane::new(random_vec(&mut rng, 1.0) + Vec3::new(0.0, 0.0, 0.05), rng.gen_range(-5.0..5.0));
        let mut direction = random_vec(&mut rng, 1.0);
        if direction.dot(&plane.normal) < 0.0 {
            direction = -direction;
        }
        let ray = Ray::new(random_vec(&mut rng, 10.0), direction);
        assert!(!ray.cast(&plane).hit);
        assert_eq!(ray.cast_against(&plane), NO_HIT);
    }
}

/// Bumpy heightfield over `[-5, 5]` in X and Z, faces pointing up
fn heightfield(rng: &mut StdRng) -> Mesh {
    scaled_heightfield(rng, 1.0)
}

/// [`heightfield`] with every coordinate multiplied by `scale`
fn scaled_heightfield(rng: &mut StdRng, scale: f32) -> Mesh {
    const CELLS: usize = 10;
    let size = CELLS + 1;
    let vertices: Vec<Vec3> = (0..size * size)
        .map(|i| {
            let x = (i % size) as f32 - 5.0;
            let z = (i / size) as f32 - 5.0;
            let y = 0.5 * x.sin() * z.cos() + rng.gen_range(-0.2..0.2);
            Vec3::new(x, y, z) * scale
        })
        .collect();

    let mut indices = Vec::with_capacity(CELLS * CELLS * 6);
    for row in 0..CELLS {
        for col in 0..CELLS {
            let p00 = (row * size + col) as u32;
            let p10 = p00 + 1;
            let p01 = p00 + size as u32;
            let p11 = p01 + 1;
            indices.extend_from_slice(&[p00, p01, p10, p10, p01, p11]);
        }
    }

    Mesh::from_indexed(&vertices, &indices).unwrap()
}

#[test]
fn test_heightfield_faces_up() {
    let mut rng = StdRng::seed_from_u64(1);
    let mesh = heightfield(&mut rng);
    assert_eq!(mesh.triangle_count(), 200);
    assert!(mesh.triangles().all(|t| t.normal().y > 0.0));
}

fn assert_raycasts_match(brute: &Mesh, rng: &mut StdRng, scale: f32) {
    for depth in 1..=4 {
        let mut accelerated = brute.clone();
        accelerated.accelerate_to_depth(depth);

        let mut hits = 0;
        for i in 0..400 {
            let origin = Vec3::new(
                rng.gen_range(-6.0..6.0),
                rng.gen_range(1.0..4.0),
                rng.gen_range(-6.0..6.0),
            ) * scale;
            // Mostly downward, with a share of arbitrary directions
            let direction = if i % 4 == 0 {
                random_vec(rng, 1.0)
            } else {
                Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..-0.1), rng.gen_range(-1.0..1.0))
            };
            let ray = Ray::new(origin, direction);

            let expected = brute.raycast_with_index(&ray);
            assert_eq!(
                accelerated.raycast_with_index(&ray),
                expected,
                "scale {scale}, depth {depth}, {ray:?}"
            );
            assert_eq!(accelerated.bvh().and_then(|root| root.raycast(&accelerated, &ray)), expected);
            if expected.is_some() {
                hits += 1;
            }
        }
        assert!(hits > 50, "only {hits} rays hit at scale {scale}, depth {depth}");
    }
}

#[test]
fn test_accelerated_raycasts_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(42);
    let brute = heightfield(&mut rng);
    assert_raycasts_match(&brute, &mut rng, 1.0);
}

#[test]
fn test_accelerated_raycasts_match_brute_force_at_large_scale() {
    let mut rng = StdRng::seed_from_u64(43);
    let brute = scaled_heightfield(&mut rng, 250.0);
    assert_raycasts_match(&brute, &mut rng, 250.0);
}

#[test]
fn test_large_triangle_edge_hits_survive_acceleration() {
    let brute = Mesh::from_triangles([Triangle::new(
        Vec3::zeros(),
        Vec3::new(1000.0, 0.0, 0.0),
        Vec3::new(0.0, 1000.0, 0.0),
    )]);
    let mut accelerated = brute.clone();
    accelerated.accelerate();

    // Just outside the x = 0 edge, within the barycentric slack
    let grazing = Ray::new(Vec3::new(-0.005, 250.0, 1.0), -Vec3::z());
    let expected = brute.raycast_with_index(&grazing);
    assert!(expected.is_some());
    assert_eq!(accelerated.raycast_with_index(&grazing), expected);

    for step in -20..=20 {
        let x = step as f32 * 0.001;
        for y in [1.0, 250.0, 500.0, 900.0] {
            let ray = Ray::new(Vec3::new(x, y, 1.0), -Vec3::z());
            assert_eq!(
                accelerated.raycast_with_index(&ray),
                brute.raycast_with_index(&ray),
                "{ray:?}"
            );
        }
    }
}

#[test]
fn test_accelerated_shape_queries_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(99);
    let brute = heightfield(&mut rng);
    let mut accelerated = brute.clone();
    accelerated.accelerate();

    let mut hits = 0;
    for _ in 0..300 {
        let shapes = Shapes::random(&mut rng, 5.0);
        let results = [
            (brute.intersects(&shapes.sphere), accelerated.intersects(&shapes.sphere)),
            (brute.intersects(&shapes.aabb), accelerated.intersects(&shapes.aabb)),
            (brute.intersects(&shapes.obb), accelerated.intersects(&shapes.obb)),
            (brute.intersects(&shapes.plane), accelerated.intersects(&shapes.plane)),
            (brute.intersects(&shapes.triangle), accelerated.intersects(&shapes.triangle)),
        ];
        for (expected, actual) in results {
            assert_eq!(actual, expected);
            hits += usize::from(expected);
        }
    }
    assert!(hits > 0);
}

#[test]
fn test_release_restores_brute_force() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut mesh = heightfield(&mut rng);
    let ray = Ray::new(Vec3::new(0.25, 5.0, 0.25), -Vec3::y());

    let before = ray.cast(&mesh);
    mesh.accelerate();
    let during = ray.cast(&mesh);
    mesh.release_acceleration();
    let after = ray.cast(&mesh);

    assert!(before.hit);
    assert_eq!(before, during);
    assert_eq!(before, after);
}
