//! Octree bounding volume hierarchy over a mesh
//!
//! Every node is either a leaf holding triangle indices into its [`Mesh`] or
//! an internal node with exactly 8 children, one per octant. A triangle that
//! straddles an octant boundary is stored in every child it touches.

use std::collections::VecDeque;

use crate::foundation::math::Vec3;
use crate::physics::collision::mesh::{nearer_hit, Mesh};
use crate::physics::collision::sat;
use crate::physics::collision::{Aabb, Intersects, Ray, Raycast, RaycastHit, Triangle};

/// Octree branching factor
pub const OCTANTS: usize = 8;

/// Padding added to node bounds when pruning queries, as a fraction of the
/// largest half-width of the node a query starts from (at least 1)
///
/// Triangle hits are accepted up to a barycentric slack proportional to the
/// triangle's size; every triangle fits inside the starting node, so this
/// padding always covers that slack.
const TRAVERSAL_MARGIN: f32 = 1e-3;

/// Contents of a node: triangle indices or 8 children, never both
#[derive(Debug, Clone, PartialEq)]
pub enum BvhKind {
    /// Indices of the triangles overlapping this node
    Leaf(Vec<usize>),
    /// One child per octant
    Internal(Box<[BvhNode; OCTANTS]>),
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct BvhNode {
    bounds: Aabb,
    kind: BvhKind,
}

impl BvhNode {
    /// Create a new leaf node
    pub fn new_leaf(bounds: Aabb, triangles: Vec<usize>) -> Self {
        Self {
            bounds,
            kind: BvhKind::Leaf(triangles),
        }
    }

    /// World-space bounds of this node
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Leaf or internal contents
    pub fn kind(&self) -> &BvhKind {
        &self.kind
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BvhKind::Leaf(_))
    }

    /// The 8 children of an internal node
    pub fn children(&self) -> Option<&[BvhNode; OCTANTS]> {
        match &self.kind {
            BvhKind::Internal(children) => Some(children),
            BvhKind::Leaf(_) => None,
        }
    }

    /// Triangle indices of a leaf node
    pub fn triangle_indices(&self) -> Option<&[usize]> {
        match &self.kind {
            BvhKind::Leaf(indices) => Some(indices),
            BvhKind::Internal(_) => None,
        }
    }

    /// Subdivide this node `depth` more levels
    ///
    /// A leaf with triangles becomes an internal node whose children split in
    /// turn with `depth - 1`. Recursion stops at depth 0 or at an empty leaf.
    pub fn split(&mut self, mesh: &Mesh, depth: u32) {
        if depth == 0 {
            return;
        }

        let indices = match &mut self.kind {
            BvhKind::Leaf(indices) if !indices.is_empty() => std::mem::take(indices),
            BvhKind::Leaf(_) => return,
            BvhKind::Internal(children) => {
                for child in children.iter_mut() {
                    child.split(mesh, depth - 1);
                }
                return;
            }
        };

        let octants = octant_bounds(&self.bounds);
        let mut buckets: [Vec<usize>; OCTANTS] = Default::default();
        for &index in &indices {
            let triangle = mesh.triangle(index);
            for (octant, bounds) in octants.iter().enumerate() {
                if sat::triangle_aabb(&triangle, bounds) {
                    buckets[octant].push(index);
                }
            }
        }

        log::trace!(
            "Split node {:?} with {} triangles into octants {:?}",
            self.bounds.origin,
            indices.len(),
            buckets.iter().map(Vec::len).collect::<Vec<_>>()
        );

        let mut children: [BvhNode; OCTANTS] = std::array::from_fn(|octant| {
            BvhNode::new_leaf(octants[octant], std::mem::take(&mut buckets[octant]))
        });
        for child in children.iter_mut() {
            child.split(mesh, depth - 1);
        }

        self.kind = BvhKind::Internal(Box::new(children));
    }

    /// Release the subtree depth-first, leaving an empty leaf
    pub fn free(&mut self) {
        if let BvhKind::Internal(children) = &mut self.kind {
            for child in children.iter_mut() {
                child.free();
            }
        }
        self.kind = BvhKind::Leaf(Vec::new());
    }

    /// Total nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        match &self.kind {
            BvhKind::Leaf(_) => 1,
            BvhKind::Internal(children) => 1 + children.iter().map(BvhNode::node_count).sum::<usize>(),
        }
    }

    /// Leaves in this subtree
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            BvhKind::Leaf(_) => 1,
            BvhKind::Internal(children) => children.iter().map(BvhNode::leaf_count).sum(),
        }
    }

    /// Levels below this node (0 for a leaf)
    pub fn depth(&self) -> u32 {
        match &self.kind {
            BvhKind::Leaf(_) => 0,
            BvhKind::Internal(children) => {
                1 + children.iter().map(BvhNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Nearest front-facing hit of `ray` on the triangles stored under this
    /// node, with the index of the triangle hit
    ///
    /// Children are queued in reverse octant order when the ray crosses their
    /// bounds; every candidate leaf is visited so the result matches a brute
    /// force scan.
    pub fn raycast(&self, mesh: &Mesh, ray: &Ray) -> Option<(usize, RaycastHit)> {
        let margin = traversal_margin(&self.bounds);
        let mut queue = VecDeque::from([self]);
        let mut best = None;

        while let Some(node) = queue.pop_front() {
            match &node.kind {
                BvhKind::Leaf(indices) => {
                    for &index in indices {
                        if let Some(hit) = mesh.triangle(index).raycast(ray) {
                            best = nearer_hit(best, (index, hit));
                        }
                    }
                }
                BvhKind::Internal(children) => {
                    for child in children.iter().rev() {
                        if padded(&child.bounds, margin).raycast(ray).is_some() {
                            queue.push_back(child);
                        }
                    }
                }
            }
        }

        best
    }

    /// True if `shape` intersects any triangle stored under this node
    pub fn intersects<S>(&self, mesh: &Mesh, shape: &S) -> bool
    where
        S: Intersects<Triangle> + Intersects<Aabb> + ?Sized,
    {
        let margin = traversal_margin(&self.bounds);
        let mut stack = vec![self];

        while let Some(node) = stack.pop() {
            if !Intersects::<Aabb>::intersects(shape, &padded(&node.bounds, margin)) {
                continue;
            }
            match &node.kind {
                BvhKind::Leaf(indices) => {
                    let hit = indices
                        .iter()
                        .any(|&index| Intersects::<Triangle>::intersects(shape, &mesh.triangle(index)));
                    if hit {
                        return true;
                    }
                }
                BvhKind::Internal(children) => stack.extend(children.iter()),
            }
        }

        false
    }
}

/// Bounds of the 8 octants of `bounds`; bit 0 of the index selects +X,
/// bit 1 +Y and bit 2 +Z
pub fn octant_bounds(bounds: &Aabb) -> [Aabb; OCTANTS] {
    let half_extents = bounds.extents * 0.5;
    std::array::from_fn(|octant| {
        let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
        let offset = Vec3::new(
            half_extents.x * sign(1),
            half_extents.y * sign(2),
            half_extents.z * sign(4),
        );
        Aabb::new(bounds.origin + offset, half_extents)
    })
}

fn traversal_margin(bounds: &Aabb) -> f32 {
    TRAVERSAL_MARGIN * bounds.extents.abs().max().max(1.0)
}

fn padded(bounds: &Aabb, margin: f32) -> Aabb {
    Aabb::new(bounds.origin, bounds.extents.map(|e| e.abs() + margin))
}
