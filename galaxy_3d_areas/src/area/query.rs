/// Query traversal over the spatial tree.
///
/// Every query is a volume that can classify node bounds and test individual
/// shapes. The traversal prunes on:
/// - node bounds (`Outside` skips the subtree)
/// - the per-node flag unions of the box and sphere leaf lists
/// - the child-presence mask
///
/// Once a node is classified `Inside`, every matching leaf below it is
/// reported without further geometric tests.

use crate::geometry::{Aabb, Coverage, FastRay, Frustum, Sphere};
use crate::utils::SetBits;
use super::spatial_tree::{BoxLeaf, NodeId, SpatialTree, SphereLeaf};
use super::types::AreaFlags;

/// A region the tree can be traversed against
pub(crate) trait QueryVolume {
    /// Coverage of a node bound
    fn classify(&self, aabb: &Aabb) -> Coverage;

    /// Whether a box leaf is hit
    fn test_box(&self, aabb: &Aabb) -> bool;

    /// Whether a sphere leaf is hit
    fn test_sphere(&self, sphere: &Sphere) -> bool;
}

impl QueryVolume for Frustum {
    #[inline]
    fn classify(&self, aabb: &Aabb) -> Coverage {
        self.classify_aabb(aabb)
    }

    #[inline]
    fn test_box(&self, aabb: &Aabb) -> bool {
        self.intersects_aabb(aabb)
    }

    #[inline]
    fn test_sphere(&self, sphere: &Sphere) -> bool {
        self.intersects_sphere(sphere)
    }
}

/// Ray restricted to `[t_min, t_max)`
pub(crate) struct RaySegment {
    pub ray: FastRay,
    pub t_min: f32,
    pub t_max: f32,
}

impl QueryVolume for RaySegment {
    // A segment never contains a volume, so nodes are at best `Partial`
    #[inline]
    fn classify(&self, aabb: &Aabb) -> Coverage {
        if self.test_box(aabb) { Coverage::Partial } else { Coverage::Outside }
    }

    #[inline]
    fn test_box(&self, aabb: &Aabb) -> bool {
        self.ray.intersect_aabb(aabb.min, aabb.max, self.t_min, self.t_max).is_some()
    }

    #[inline]
    fn test_sphere(&self, sphere: &Sphere) -> bool {
        self.ray.intersect_sphere(sphere, self.t_min, self.t_max).is_some()
    }
}

/// Leaf handed to query visitors
#[derive(Debug, Clone, Copy)]
pub(crate) enum LeafRef<'a> {
    Box(&'a BoxLeaf),
    Sphere(&'a SphereLeaf),
}

impl SpatialTree {
    /// Visit every leaf whose flags intersect `flags` and whose shape is hit
    /// by `volume`. Each leaf is visited at most once.
    pub fn query<V, F>(&self, volume: &V, flags: AreaFlags, visitor: &mut F)
    where
        V: QueryVolume,
        F: FnMut(LeafRef<'_>),
    {
        if flags.is_empty() {
            return;
        }
        for root in self.roots() {
            self.query_node(root, volume, flags, false, visitor);
        }
    }

    fn query_node<V, F>(&self, id: NodeId, volume: &V, flags: AreaFlags, inside: bool, visitor: &mut F)
    where
        V: QueryVolume,
        F: FnMut(LeafRef<'_>),
    {
        let node = self.node(id);
        if node.aabb.is_empty() {
            return;
        }

        let inside = inside || match volume.classify(&node.aabb) {
            Coverage::Outside => return,
            Coverage::Inside => true,
            Coverage::Partial => false,
        };

        if node.box_flags.intersects(flags) {
            for leaf in &node.boxes {
                if leaf.area.flags.intersects(flags) && (inside || volume.test_box(&leaf.bounds)) {
                    visitor(LeafRef::Box(leaf));
                }
            }
        }

        if node.sphere_flags.intersects(flags) {
            for leaf in &node.spheres {
                if leaf.area.flags.intersects(flags) && (inside || volume.test_sphere(&leaf.bounds)) {
                    visitor(LeafRef::Sphere(leaf));
                }
            }
        }

        if let Some(first_child) = node.first_child {
            for octant in SetBits(node.child_mask) {
                self.query_node(first_child.child(octant), volume, flags, inside, visitor);
            }
        }
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
