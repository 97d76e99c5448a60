/// SpatialTree - sparse grid of loose octrees holding area leaves.
///
/// Each root covers one cell of an infinite grid (`top_level_size` wide) and
/// splits lazily into 8 children down to `bottom_level_size`. A shape is
/// stored as a leaf in exactly one node, chosen by its size and center:
/// - the level is the one whose leaf-extent range contains the shape's
///   largest half-size (roots accept anything larger, the deepest level
///   anything smaller)
/// - the cell is the one containing the shape's center
///
/// Nodes never move or die. They live in a flat arena and refer to each
/// other by `NodeId`; the 8 children of a node are allocated together and
/// are contiguous.
///
/// Every node keeps a dynamic AABB that is always a superset of its content.
/// Writes only ever grow it (`expand`); `recompute` shrinks it back to the
/// exact union and is driven by the reoptimizer.

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;
use crate::geometry::{Aabb, Sphere};
use super::config::AreaSystemConfig;
use super::types::{Area, AreaFlags};

/// Index of a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    fn slot(self) -> usize {
        self.0 as usize
    }

    /// Id of child `octant` in a children block starting at `self`
    #[inline]
    pub(crate) fn child(self, octant: u32) -> NodeId {
        debug_assert!(octant < 8);
        NodeId(self.0 + octant)
    }
}

/// Box leaf
#[derive(Debug, Clone, Copy)]
pub(crate) struct BoxLeaf {
    pub bounds: Aabb,
    pub area: Area,
}

/// Sphere leaf
#[derive(Debug, Clone, Copy)]
pub(crate) struct SphereLeaf {
    pub bounds: Sphere,
    pub area: Area,
}

/// A single cell of the tree
#[derive(Debug)]
pub(crate) struct SpatialNode {
    pub parent: Option<NodeId>,
    pub depth: u8,

    // Static cell, fixed at creation
    pub static_origin: Vec3,
    pub unpadded_extent: f32,
    pub min_leaf_extent: f32,
    pub max_leaf_extent: f32,

    // Dynamic bound of everything below this node
    pub aabb: Aabb,

    // Leaves
    pub boxes: Vec<BoxLeaf>,
    pub spheres: Vec<SphereLeaf>,
    pub box_flags: AreaFlags,
    pub sphere_flags: AreaFlags,

    // Children: bit i of `child_mask` set iff child i may hold content
    pub child_mask: u32,
    pub first_child: Option<NodeId>,

    pub in_queue: bool,
}

impl SpatialNode {
    fn new(parent: Option<NodeId>, depth: u8, static_origin: Vec3, unpadded_extent: f32) -> Self {
        Self {
            parent,
            depth,
            static_origin,
            unpadded_extent,
            min_leaf_extent: 0.0,
            max_leaf_extent: 0.0,
            aabb: Aabb::EMPTY,
            boxes: Vec::new(),
            spheres: Vec::new(),
            box_flags: AreaFlags::empty(),
            sphere_flags: AreaFlags::empty(),
            child_mask: 0,
            first_child: None,
            in_queue: false,
        }
    }

    /// Whether a shape of half-size `extent` centered at `origin` may stay here
    pub fn is_valid_leaf(&self, origin: Vec3, extent: f32) -> bool {
        if extent < self.min_leaf_extent || extent > self.max_leaf_extent {
            return false;
        }
        let max_delta = (origin - self.static_origin).abs().max_element();
        max_delta <= self.unpadded_extent
    }

    /// Exact union of the leaves stored directly in this node
    fn leaf_bounds(&self) -> Aabb {
        let boxes = self.boxes.iter().fold(Aabb::EMPTY, |acc, leaf| acc.union(&leaf.bounds));
        self.spheres.iter().fold(boxes, |acc, leaf| acc.union(&leaf.bounds.aabb()))
    }
}

/// Octant of `point` relative to `center`.
///
/// Bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low, 1 = high).
#[inline]
fn point_octant(center: Vec3, point: Vec3) -> u32 {
    ((point.x >= center.x) as u32)
        | (((point.y >= center.y) as u32) << 1)
        | (((point.z >= center.z) as u32) << 2)
}

/// Arena of nodes plus the sparse root grid
pub(crate) struct SpatialTree {
    nodes: Vec<SpatialNode>,
    roots: FxHashMap<IVec3, NodeId>,
    grid_origin: Vec3,
    top_level_size: f32,
    bottom_half_extent: f32,
    padding_ratio: f32,
}

impl SpatialTree {
    pub fn new(config: &AreaSystemConfig) -> Self {
        Self {
            nodes: Vec::new(),
            roots: FxHashMap::default(),
            grid_origin: config.grid_origin,
            top_level_size: config.top_level_size,
            bottom_half_extent: config.bottom_level_size * 0.5,
            padding_ratio: config.padding_ratio,
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &SpatialNode {
        &self.nodes[id.slot()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut SpatialNode {
        &mut self.nodes[id.slot()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.values().copied()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Root of the tree holding `id`
    pub fn root_of(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.node(id).parent {
            id = parent;
        }
        id
    }

    /// Grid cell containing `origin`
    pub fn root_key(&self, origin: Vec3) -> IVec3 {
        ((origin - self.grid_origin) / self.top_level_size).floor().as_ivec3()
    }

    /// Find the node that should own a leaf of half-size `extent` at `origin`,
    /// creating the root and any children on the way.
    pub fn place(&mut self, origin: Vec3, extent: f32) -> NodeId {
        let key = self.root_key(origin);
        let mut id = match self.roots.get(&key) {
            Some(&root) => root,
            None => self.create_root(key),
        };

        loop {
            let node = self.node(id);
            if extent < node.min_leaf_extent {
                let octant = point_octant(node.static_origin, origin);
                let children = node.first_child;
                let first_child = match children {
                    Some(first_child) => first_child,
                    None => self.allocate_children(id),
                };
                self.node_mut(id).child_mask |= 1 << octant;
                id = first_child.child(octant);
            } else {
                return id;
            }
        }
    }

    fn create_root(&mut self, key: IVec3) -> NodeId {
        let unpadded_extent = self.top_level_size * 0.5;
        let static_origin = self.grid_origin + (key.as_vec3() + 0.5) * self.top_level_size;

        let mut root = SpatialNode::new(None, 0, static_origin, unpadded_extent);
        root.max_leaf_extent = f32::INFINITY;
        root.min_leaf_extent = if unpadded_extent <= self.bottom_half_extent {
            f32::NEG_INFINITY
        } else {
            unpadded_extent * self.padding_ratio * 0.5
        };

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(root);
        self.roots.insert(key, id);

        crate::engine_debug!(
            "galaxy3d::SpatialTree",
            "Root cell {:?} created at {:?} ({} roots)",
            key, static_origin, self.roots.len()
        );
        id
    }

    fn allocate_children(&mut self, parent: NodeId) -> NodeId {
        let (origin, depth, parent_extent) = {
            let node = self.node(parent);
            (node.static_origin, node.depth, node.unpadded_extent)
        };

        let child_extent = parent_extent * 0.5;
        let max_leaf_extent = child_extent * self.padding_ratio;
        let min_leaf_extent = if child_extent <= self.bottom_half_extent {
            f32::NEG_INFINITY
        } else {
            max_leaf_extent * 0.5
        };

        let first_child = NodeId(self.nodes.len() as u32);
        for octant in 0..8u32 {
            let offset = Vec3::new(
                if octant & 1 == 0 { -child_extent } else { child_extent },
                if octant & 2 == 0 { -child_extent } else { child_extent },
                if octant & 4 == 0 { -child_extent } else { child_extent },
            );
            let mut child = SpatialNode::new(Some(parent), depth + 1, origin + offset, child_extent);
            child.min_leaf_extent = min_leaf_extent;
            child.max_leaf_extent = max_leaf_extent;
            self.nodes.push(child);
        }
        self.node_mut(parent).first_child = Some(first_child);

        crate::engine_trace!(
            "galaxy3d::SpatialTree",
            "Children allocated at depth {} around {:?}",
            depth + 1, origin
        );
        first_child
    }

    /// Append a box leaf and grow bounds; returns its index in the node
    pub fn push_box(&mut self, id: NodeId, leaf: BoxLeaf) -> u32 {
        let node = self.node_mut(id);
        let index = node.boxes.len() as u32;
        node.box_flags |= leaf.area.flags;
        node.boxes.push(leaf);
        self.expand(id, &leaf.bounds);
        index
    }

    /// Append a sphere leaf and grow bounds; returns its index in the node
    pub fn push_sphere(&mut self, id: NodeId, leaf: SphereLeaf) -> u32 {
        let node = self.node_mut(id);
        let index = node.spheres.len() as u32;
        node.sphere_flags |= leaf.area.flags;
        node.spheres.push(leaf);
        self.expand(id, &leaf.bounds.aabb());
        index
    }

    /// Union `bounds` into the node and its ancestors.
    ///
    /// Stops at the first node that does not grow: a parent always encloses
    /// its children, so nothing above can grow either.
    pub fn expand(&mut self, id: NodeId, bounds: &Aabb) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.node_mut(id);
            let grown = node.aabb.union(bounds);
            if grown == node.aabb {
                break;
            }
            node.aabb = grown;
            current = node.parent;
        }
    }

    /// Union of the node's own leaves and its children's current bounds.
    ///
    /// Equal to the true content bound once every descendant is exact.
    pub fn exact_bounds(&self, id: NodeId) -> Aabb {
        let node = self.node(id);
        let mut aabb = node.leaf_bounds();
        if let Some(first_child) = node.first_child {
            for octant in 0..8 {
                aabb = aabb.union(&self.node(first_child.child(octant)).aabb);
            }
        }
        aabb
    }

    /// Recompute the node's bound, flag unions, and child mask exactly.
    ///
    /// Returns the parent, whose bound may now be tightenable.
    pub fn recompute(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);

        let mut aabb = node.leaf_bounds();
        let box_flags = node.boxes.iter().fold(AreaFlags::empty(), |acc, leaf| acc | leaf.area.flags);
        let sphere_flags = node.spheres.iter().fold(AreaFlags::empty(), |acc, leaf| acc | leaf.area.flags);

        let mut child_mask = 0;
        if let Some(first_child) = node.first_child {
            for octant in 0..8 {
                let child = self.node(first_child.child(octant));
                if !child.aabb.is_empty() {
                    child_mask |= 1 << octant;
                    aabb = aabb.union(&child.aabb);
                }
            }
        }

        let node = self.node_mut(id);
        node.aabb = aabb;
        node.box_flags = box_flags;
        node.sphere_flags = sphere_flags;
        node.child_mask = child_mask;
        node.parent
    }
}

#[cfg(test)]
#[path = "spatial_tree_tests.rs"]
mod tests;
