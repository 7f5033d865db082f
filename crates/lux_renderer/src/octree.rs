//! Octree spatial index over a scene's spheres and triangles.
//!
//! Nodes live in one flat array (root at index 0) and refer to each other by
//! index, never by pointer, so the arrays can be uploaded to a device as-is.
//! Leaves point into a shared index buffer: first their spheres, then their
//! triangles. Planes are unbounded and never enter the tree.

use std::collections::TryReserveError;
use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use lux_core::Scene;
use lux_math::{Aabb, Interval, Ray, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hittable::{Hit, Hittable};
use crate::overlap::{sphere_overlaps_box, triangle_overlaps_box};

/// Sentinel child index of leaf nodes.
pub const NO_CHILD: i32 = -1;

/// Relative padding applied to the root box so it is never flat.
const ROOT_PADDING: f32 = 1e-4;

/// Errors that can occur while building an octree.
#[derive(Error, Debug)]
pub enum OctreeError {
    #[error("Out of memory while building octree: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

/// Subdivision policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// A node whose filtering made no progress becomes a leaf once both of
    /// its sphere and triangle counts are below this floor
    pub min_elements: usize,
    /// Hard cap on subdivision depth (root = 0).
    ///
    /// Nodes are 72 bytes each. Around a dense surface mesh every extra level
    /// multiplies the node count by roughly four, so a 20k triangle mesh
    /// needs millions of nodes at depth 10.
    pub max_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            min_elements: 32,
            max_depth: 8,
        }
    }
}

/// One node of the flattened tree.
///
/// Internal nodes have 8 valid children and empty ranges; leaves have
/// `NO_CHILD` everywhere and describe their primitives by offset + count.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OctreeNode {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub children: [i32; 8],
    pub sphere_offset: u32,
    pub sphere_count: u32,
    pub triangle_offset: u32,
    pub triangle_count: u32,
}

impl OctreeNode {
    fn leaf(bbox: Aabb) -> Self {
        Self {
            min: bbox.min.to_array(),
            max: bbox.max.to_array(),
            children: [NO_CHILD; 8],
            sphere_offset: 0,
            sphere_count: 0,
            triangle_offset: 0,
            triangle_count: 0,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::new(Vec3::from_array(self.min), Vec3::from_array(self.max))
    }

    pub fn is_leaf(&self) -> bool {
        self.children[0] == NO_CHILD
    }

    fn sphere_range(&self) -> std::ops::Range<usize> {
        let start = self.sphere_offset as usize;
        start..start + self.sphere_count as usize
    }

    fn triangle_range(&self) -> std::ops::Range<usize> {
        let start = self.triangle_offset as usize;
        start..start + self.triangle_count as usize
    }
}

/// Immutable octree built from one scene snapshot.
///
/// Any change to the scene's spheres or triangles invalidates it; rebuild
/// from scratch.
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    indices: Vec<u32>,
    depth: u32,
    sphere_count: usize,
    triangle_count: usize,
}

impl Octree {
    /// Build the tree for all spheres and triangles of `scene`.
    ///
    /// Fails only if an allocation fails; no partial tree is returned.
    pub fn build(scene: &Scene, config: &OctreeConfig) -> Result<Self, OctreeError> {
        let start = Instant::now();

        let root_box = scene
            .bounded_extent()
            .map_or(Aabb::new(Vec3::ZERO, Vec3::ZERO), |b| b.padded(ROOT_PADDING));

        let sphere_ids = all_ids(scene.spheres().len())?;
        let triangle_ids = all_ids(scene.triangles().len())?;

        let mut builder = Builder {
            scene,
            config,
            nodes: Vec::new(),
            indices: Vec::new(),
            depth: 0,
        };
        builder.build_node(&sphere_ids, &triangle_ids, root_box, 0)?;

        let Builder {
            mut nodes,
            mut indices,
            depth,
            ..
        } = builder;
        nodes.shrink_to_fit();
        indices.shrink_to_fit();

        let octree = Self {
            nodes,
            indices,
            depth,
            sphere_count: scene.spheres().len(),
            triangle_count: scene.triangles().len(),
        };

        log::info!(
            "Built octree: {} nodes ({} leaves), depth {}, {} indices for {} spheres + {} triangles in {:?}",
            octree.node_count(),
            octree.leaf_count(),
            octree.depth,
            octree.indices.len(),
            octree.sphere_count,
            octree.triangle_count,
            start.elapsed()
        );

        Ok(octree)
    }

    /// Closest sphere or triangle hit inside `ray_t`.
    ///
    /// Visits every leaf whose box the ray crosses before the closest hit
    /// found so far, so it agrees with a brute-force search over all primitives.
    pub fn closest_hit(&self, scene: &Scene, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        debug_assert!(self.matches(scene), "octree is stale for this scene");

        let mut closest: Option<Hit> = None;
        let mut stack: Vec<u32> = Vec::with_capacity(8 * (self.depth as usize + 1));
        stack.push(0);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            let range = ray_t.with_max(closest.map_or(ray_t.max, |h| h.t));
            if !node.bounding_box().hit(ray, range) {
                continue;
            }

            if !node.is_leaf() {
                stack.extend(node.children.iter().map(|&c| c as u32));
                continue;
            }

            for &i in self.leaf_spheres(node) {
                let range = ray_t.with_max(closest.map_or(ray_t.max, |h| h.t));
                if let Some(hit) = scene.spheres()[i as usize].hit(ray, range) {
                    closest = Some(hit);
                }
            }
            for &i in self.leaf_triangles(node) {
                let range = ray_t.with_max(closest.map_or(ray_t.max, |h| h.t));
                if let Some(hit) = scene.triangles()[i as usize].hit(ray, range) {
                    closest = Some(hit);
                }
            }
        }

        closest
    }

    /// True if the tree was built from a scene with the same primitive counts.
    pub fn matches(&self, scene: &Scene) -> bool {
        self.sphere_count == scene.spheres().len() && self.triangle_count == scene.triangles().len()
    }

    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    pub fn root(&self) -> &OctreeNode {
        &self.nodes[0]
    }

    /// Leaves together with their node index.
    pub fn leaves(&self) -> impl Iterator<Item = (usize, &OctreeNode)> {
        self.nodes.iter().enumerate().filter(|(_, n)| n.is_leaf())
    }

    /// Sphere indices stored by a leaf.
    pub fn leaf_spheres(&self, node: &OctreeNode) -> &[u32] {
        &self.indices[node.sphere_range()]
    }

    /// Triangle indices stored by a leaf.
    pub fn leaf_triangles(&self, node: &OctreeNode) -> &[u32] {
        &self.indices[node.triangle_range()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Deepest level reached (root = 0).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Node array as raw bytes for a read-only device buffer.
    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Flattened primitive-index array as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// `0..count` as u32 ids.
fn all_ids(count: usize) -> Result<Vec<u32>, OctreeError> {
    let mut ids = Vec::new();
    ids.try_reserve_exact(count)?;
    ids.extend(0..count as u32);
    Ok(ids)
}

/// Subset of `candidates` accepted by `keep`.
fn filter_ids(candidates: &[u32], keep: impl Fn(usize) -> bool) -> Result<Vec<u32>, OctreeError> {
    let mut kept = Vec::new();
    kept.try_reserve_exact(candidates.len())?;
    kept.extend(candidates.iter().copied().filter(|&i| keep(i as usize)));
    kept.shrink_to_fit();
    Ok(kept)
}

struct Builder<'a> {
    scene: &'a Scene,
    config: &'a OctreeConfig,
    nodes: Vec<OctreeNode>,
    indices: Vec<u32>,
    depth: u32,
}

impl Builder<'_> {
    /// Build the node for `bbox` from its parent's candidates; returns its index.
    fn build_node(
        &mut self,
        parent_spheres: &[u32],
        parent_triangles: &[u32],
        bbox: Aabb,
        depth: u32,
    ) -> Result<u32, OctreeError> {
        let scene = self.scene;
        let spheres = filter_ids(parent_spheres, |i| sphere_overlaps_box(&scene.spheres()[i], &bbox))?;
        let triangles = filter_ids(parent_triangles, |i| {
            triangle_overlaps_box(&scene.triangles()[i], &bbox)
        })?;

        self.nodes.try_reserve(1)?;
        let id = self.nodes.len();
        self.nodes.push(OctreeNode::leaf(bbox));
        self.depth = self.depth.max(depth);

        let progress = spheres.len() < parent_spheres.len() || triangles.len() < parent_triangles.len();
        if self.should_split(spheres.len(), triangles.len(), progress, &bbox, depth) {
            let mut children = [NO_CHILD; 8];
            for (octant, child) in children.iter_mut().enumerate() {
                *child = self.build_node(&spheres, &triangles, bbox.octant(octant), depth + 1)? as i32;
            }
            self.nodes[id].children = children;
        } else {
            self.indices.try_reserve(spheres.len() + triangles.len())?;
            let node = &mut self.nodes[id];
            node.sphere_offset = self.indices.len() as u32;
            node.sphere_count = spheres.len() as u32;
            self.indices.extend_from_slice(&spheres);
            node.triangle_offset = self.indices.len() as u32;
            node.triangle_count = triangles.len() as u32;
            self.indices.extend_from_slice(&triangles);
        }

        Ok(id as u32)
    }

    fn should_split(&self, spheres: usize, triangles: usize, progress: bool, bbox: &Aabb, depth: u32) -> bool {
        if spheres == 0 && triangles == 0 {
            return false;
        }
        if depth == 0 {
            return true;
        }
        if depth >= self.config.max_depth || !bbox.has_volume() {
            return false;
        }
        // Without this, a primitive spanning the whole box recurses forever
        let floor = self.config.min_elements;
        progress || spheres >= floor || triangles >= floor
    }
}
