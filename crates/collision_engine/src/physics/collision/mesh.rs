//! Triangle mesh collision shape
//!
//! A [`Mesh`] owns one contiguous buffer of scalars laid out as
//! `[ax, ay, az, bx, by, bz, cx, cy, cz]` per triangle: 9 scalars per
//! triangle, 3 vertices per triangle. The same buffer is exposed as
//! triangles, vertices and raw scalars.
//!
//! Queries are brute force until [`Mesh::accelerate`] builds an octree
//! ([`BvhNode`]); acceleration changes how many triangles get tested, never
//! the answer.

use crate::config::{CollisionConfig, DEFAULT_BVH_DEPTH};
use crate::foundation::math::Vec3;
use crate::spatial::BvhNode;
use super::intersect::Intersects;
use super::primitives::{Aabb, Triangle};
use super::raycast::{Ray, Raycast, RaycastHit};

/// Scalars stored per triangle
pub const SCALARS_PER_TRIANGLE: usize = 9;

/// Vertices stored per triangle
pub const VERTICES_PER_TRIANGLE: usize = 3;

/// Errors raised while building a mesh from raw data
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Scalar buffer length is not a whole number of triangles
    #[error("scalar buffer length {0} is not a multiple of {SCALARS_PER_TRIANGLE}")]
    InvalidBufferLength(usize),

    /// An index refers past the end of the vertex list
    #[error("vertex index {index} out of range ({vertex_count} vertices)")]
    IndexOutOfRange {
        /// Offending index
        index: u32,
        /// Number of vertices supplied
        vertex_count: usize,
    },

    /// Index list length is not a multiple of 3
    #[error("index buffer has {0} trailing indices that do not form a triangle")]
    IncompleteTriangle(usize),
}

/// Triangle soup with an optional octree accelerator
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    scalars: Vec<f32>,
    bvh: Option<BvhNode>,
}

impl Mesh {
    /// Creates a mesh from triangles
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = Triangle>,
    {
        let scalars = triangles
            .into_iter()
            .flat_map(|triangle| triangle.to_scalars())
            .collect();
        Self { scalars, bvh: None }
    }

    /// Creates a mesh from a flat scalar buffer (9 scalars per triangle)
    pub fn from_scalars(scalars: Vec<f32>) -> Result<Self, MeshError> {
        if scalars.len() % SCALARS_PER_TRIANGLE != 0 {
            return Err(MeshError::InvalidBufferLength(scalars.len()));
        }
        Ok(Self { scalars, bvh: None })
    }

    /// Creates a mesh from a vertex list and triangle indices
    pub fn from_indexed(vertices: &[Vec3], indices: &[u32]) -> Result<Self, MeshError> {
        let trailing = indices.len() % VERTICES_PER_TRIANGLE;
        if trailing != 0 {
            return Err(MeshError::IncompleteTriangle(trailing));
        }

        let mut scalars = Vec::with_capacity(indices.len() * 3);
        for &index in indices {
            let vertex = vertices.get(index as usize).ok_or(MeshError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            })?;
            scalars.extend_from_slice(vertex.as_slice());
        }

        Ok(Self { scalars, bvh: None })
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.scalars.len() / SCALARS_PER_TRIANGLE
    }

    /// True if the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }

    /// Triangle at `index`
    ///
    /// # Panics
    /// Panics if `index >= triangle_count()`.
    pub fn triangle(&self, index: usize) -> Triangle {
        let count = self.triangle_count();
        assert!(index < count, "triangle index {index} out of range (expected < {count})");
        Triangle::from_scalars(&self.triangle_scalars()[index])
    }

    /// Vertex at `index`
    ///
    /// # Panics
    /// Panics if `index >= vertices().len()`.
    pub fn vertex(&self, index: usize) -> Vec3 {
        let vertices = self.vertices();
        assert!(
            index < vertices.len(),
            "vertex index {index} out of range (expected < {})",
            vertices.len()
        );
        Vec3::from(vertices[index])
    }

    /// The buffer viewed as vertices, 3 per triangle
    pub fn vertices(&self) -> &[[f32; 3]] {
        bytemuck::cast_slice(&self.scalars)
    }

    /// The raw scalar buffer
    pub fn scalars(&self) -> &[f32] {
        &self.scalars
    }

    /// Iterate over all triangles in buffer order
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.triangle_scalars().iter().map(Triangle::from_scalars)
    }

    fn triangle_scalars(&self) -> &[[f32; SCALARS_PER_TRIANGLE]] {
        bytemuck::cast_slice(&self.scalars)
    }

    /// Tight box around every vertex, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices().iter().copied().map(Vec3::from))
    }

    /// Build the octree with the default depth
    pub fn accelerate(&mut self) {
        self.accelerate_to_depth(DEFAULT_BVH_DEPTH);
    }

    /// Build the octree with the depth from `config`
    pub fn accelerate_with(&mut self, config: &CollisionConfig) {
        self.accelerate_to_depth(config.effective_depth());
    }

    /// Build the octree, subdividing `depth` levels below the root
    ///
    /// Any existing tree is replaced.
    pub fn accelerate_to_depth(&mut self, depth: u32) {
        let bounds = self
            .bounds()
            .unwrap_or_else(|| Aabb::new(Vec3::zeros(), Vec3::zeros()));

        let mut root = BvhNode::new_leaf(bounds, (0..self.triangle_count()).collect());
        root.split(self, depth);

        log::debug!(
            "Accelerated mesh: {} triangles, depth {}, {} nodes, {} leaves",
            self.triangle_count(),
            depth,
            root.node_count(),
            root.leaf_count()
        );

        self.bvh = Some(root);
    }

    /// True once [`accelerate`](Self::accelerate) has built a tree
    pub fn is_accelerated(&self) -> bool {
        self.bvh.is_some()
    }

    /// Root of the octree, if built
    pub fn bvh(&self) -> Option<&BvhNode> {
        self.bvh.as_ref()
    }

    /// Drop the octree; later queries fall back to brute force
    pub fn release_acceleration(&mut self) {
        if let Some(mut root) = self.bvh.take() {
            root.free();
        }
    }

    /// True if any triangle of the mesh intersects `shape`
    pub fn intersects<S>(&self, shape: &S) -> bool
    where
        S: Intersects<Triangle> + Intersects<Aabb> + ?Sized,
    {
        match &self.bvh {
            Some(root) => root.intersects(self, shape),
            None => self
                .triangles()
                .any(|triangle| Intersects::<Triangle>::intersects(shape, &triangle)),
        }
    }

    /// Nearest front-facing hit along `ray` and the index of the triangle hit
    ///
    /// Equal distances resolve to the lower triangle index.
    pub fn raycast_with_index(&self, ray: &Ray) -> Option<(usize, RaycastHit)> {
        match &self.bvh {
            Some(root) => root.raycast(self, ray),
            None => self
                .triangles()
                .enumerate()
                .filter_map(|(index, triangle)| triangle.raycast(ray).map(|hit| (index, hit)))
                .fold(None, nearer_hit),
        }
    }
}

impl Raycast for Mesh {
    fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        self.raycast_with_index(ray).map(|(_, hit)| hit)
    }
}

/// Keep whichever of `best` and `candidate` is closer; ties go to the lower index
pub(crate) fn nearer_hit(
    best: Option<(usize, RaycastHit)>,
    candidate: (usize, RaycastHit),
) -> Option<(usize, RaycastHit)> {
    match best {
        Some((index, hit))
            if hit.distance < candidate.1.distance
                || (hit.distance == candidate.1.distance && index <= candidate.0) =>
        {
            Some((index, hit))
        }
        _ => Some(candidate),
    }
}
