//! Ray casting demo
//!
//! Builds a procedural terrain mesh, accelerates it with the octree and
//! casts a batch of random rays from several worker threads that share the
//! mesh read-only. Pass a `.toml` or `.ron` file to override the octree
//! depth.

use collision_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Terrain resolution (cells per side)
const GRID_CELLS: usize = 64;

/// Rays cast per worker thread
const RAYS_PER_WORKER: usize = 20_000;

/// Errors that end the demo
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("failed to load config: {0}")]
    Config(#[from] collision_engine::config::ConfigError),

    #[error("failed to build terrain: {0}")]
    Mesh(#[from] MeshError),

    #[error("{0} ray casting worker(s) panicked")]
    WorkerPanicked(usize),
}

/// Rolling terrain over `[-half, half]` in X and Z
fn build_terrain(cells: usize) -> Result<Mesh, MeshError> {
    let size = cells + 1;
    let half = cells as f32 * 0.5;

    let vertices: Vec<Vec3> = (0..size * size)
        .map(|i| {
            let x = (i % size) as f32 - half;
            let z = (i / size) as f32 - half;
            let y = 2.0 * (x * 0.15).sin() * (z * 0.1).cos() + 0.5 * (x * 0.5 + z * 0.3).sin();
            Vec3::new(x, y, z)
        })
        .collect();

    let mut indices = Vec::with_capacity(cells * cells * 6);
    for row in 0..cells {
        for col in 0..cells {
            let p00 = (row * size + col) as u32;
            let p10 = p00 + 1;
            let p01 = p00 + size as u32;
            let p11 = p01 + 1;
            indices.extend_from_slice(&[p00, p01, p10, p10, p01, p11]);
        }
    }

    Mesh::from_indexed(&vertices, &indices)
}

/// Statistics gathered by one worker
#[derive(Debug, Default, Clone, Copy)]
struct CastStats {
    rays: usize,
    hits: usize,
    total_distance: f32,
}

impl CastStats {
    fn merge(self, other: Self) -> Self {
        Self {
            rays: self.rays + other.rays,
            hits: self.hits + other.hits,
            total_distance: self.total_distance + other.total_distance,
        }
    }
}

/// Sum the stats of finished workers, logging and counting the ones that panicked
fn merge_results<I>(results: I) -> (CastStats, usize)
where
    I: IntoIterator<Item = std::thread::Result<CastStats>>,
{
    let mut panicked = 0;
    let totals = results
        .into_iter()
        .enumerate()
        .filter_map(|(worker, result)| match result {
            Ok(stats) => Some(stats),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("unknown panic");
                log::error!("Worker {worker} panicked: {message}");
                panicked += 1;
                None
            }
        })
        .fold(CastStats::default(), CastStats::merge);
    (totals, panicked)
}

fn cast_batch(mesh: &Mesh, seed: u64, count: usize, extent: f32) -> CastStats {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stats = CastStats::default();

    for _ in 0..count {
        let origin = Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(5.0..20.0),
            rng.gen_range(-extent..extent),
        );
        let direction = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..-0.2),
            rng.gen_range(-1.0..1.0),
        );

        let hit = Ray::new(origin, direction).cast(mesh);
        stats.rays += 1;
        if hit.hit {
            stats.hits += 1;
            stats.total_distance += hit.distance;
        }
    }

    stats
}

fn main() -> Result<(), DemoError> {
    collision_engine::foundation::logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading collision config from {path}");
            CollisionConfig::load_from_file(&path)?
        }
        None => CollisionConfig::default(),
    };

    let mut mesh = build_terrain(GRID_CELLS)?;
    log::info!("Built terrain with {} triangles", mesh.triangle_count());

    let extent = GRID_CELLS as f32 * 0.5;
    let workers = std::thread::available_parallelism().map_or(4, usize::from);

    let start = Instant::now();
    let brute = cast_batch(&mesh, 0, RAYS_PER_WORKER / 10, extent);
    log::info!(
        "Brute force: {} rays, {} hits in {:.2?}",
        brute.rays,
        brute.hits,
        start.elapsed()
    );

    let start = Instant::now();
    mesh.accelerate_with(&config);
    log::info!(
        "Accelerated to depth {} in {:.2?} ({} nodes, {} leaves)",
        config.effective_depth(),
        start.elapsed(),
        mesh.bvh().map_or(0, BvhNode::node_count),
        mesh.bvh().map_or(0, BvhNode::leaf_count)
    );

    // Same seed, same rays: the tree must not change the answer
    let check = cast_batch(&mesh, 0, RAYS_PER_WORKER / 10, extent);
    if check.hits != brute.hits {
        log::error!("Accelerated hits {} differ from brute force {}", check.hits, brute.hits);
    }

    let start = Instant::now();
    let mesh = &mesh;
    let (totals, panicked) = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| scope.spawn(move || cast_batch(mesh, worker as u64 + 1, RAYS_PER_WORKER, extent)))
            .collect();

        merge_results(handles.into_iter().map(|handle| handle.join()))
    });
    let elapsed = start.elapsed();
    if panicked > 0 {
        return Err(DemoError::WorkerPanicked(panicked));
    }

    log::info!(
        "{} workers cast {} rays in {:.2?}: {} hits, mean distance {:.3}",
        workers,
        totals.rays,
        elapsed,
        totals.hits,
        if totals.hits > 0 { totals.total_distance / totals.hits as f32 } else { 0.0 }
    );

    let marker = Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.5);
    log::info!("Marker sphere touches terrain: {}", mesh.intersects(&marker));

    Ok(())
}
