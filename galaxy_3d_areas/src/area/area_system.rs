/// AreaSystem - spatial index of box and sphere areas with visibility deltas.
///
/// Owns the spatial tree, the reoptimizer, the area records, and the
/// visibility tracker. Intended frame flow:
///
/// 1. mutate (`add_*`, `update_*`, `remove_*`, `update_entity_transform`)
/// 2. `optimize()` to tighten a slice of stale bounds
/// 3. query (`query_frustum`, `cast_ray`) and `update_visibility`
///
/// Misusing an area id (removed, out of range, wrong shape kind) is a
/// contract violation and panics.

use glam::Mat4;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::error::{Error, Result};
use crate::geometry::{Aabb, FastRay, Frustum, Ray, Sphere};
use crate::utils::IdAllocator;
use super::config::AreaSystemConfig;
use super::query::{LeafRef, RaySegment};
use super::reoptimizer::Reoptimizer;
use super::spatial_tree::{BoxLeaf, NodeId, SpatialTree, SphereLeaf};
use super::types::{
    Area, AreaBounds, AreaFlags, AreaId, AreaIds, EntityId, GroupKey, LocalShape, ShapeKind,
};
use super::visibility::{GroupVisibility, VisibilityTracker};

/// Where an area lives and who it belongs to
#[derive(Debug, Clone, Copy, Default)]
struct AreaRecord {
    node: Option<NodeId>,
    index: u32,
    /// `None` while the id is free
    kind: Option<ShapeKind>,
    group: GroupKey,
    user_id: u32,
    flags: AreaFlags,
    entity: Option<EntityId>,
    local_shape: Option<LocalShape>,
}

#[derive(Debug, Default)]
struct GroupState {
    users: FxHashMap<u32, AreaId>,
    area_count: usize,
}

pub struct AreaSystem {
    config: AreaSystemConfig,
    tree: SpatialTree,
    reoptimizer: Reoptimizer,
    records: Vec<AreaRecord>,
    ids: IdAllocator,
    groups: SlotMap<GroupKey, GroupState>,
    visibility: VisibilityTracker,
    entity_areas: FxHashMap<EntityId, Vec<AreaId>>,
}

impl AreaSystem {
    /// Create an area system
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the configuration does not validate.
    pub fn new(config: AreaSystemConfig) -> Result<Self> {
        config.validate().map_err(Self::log_and_return_error)?;

        crate::engine_info!(
            "galaxy3d::AreaSystem",
            "Area system created ({} levels, cells {} down to {})",
            config.level_count(), config.top_level_size, config.bottom_level_size
        );
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: AreaSystemConfig) -> Self {
        Self {
            tree: SpatialTree::new(&config),
            reoptimizer: Reoptimizer::new(&config),
            records: Vec::new(),
            ids: IdAllocator::new(),
            groups: SlotMap::with_key(),
            visibility: VisibilityTracker::new(),
            entity_areas: FxHashMap::default(),
            config,
        }
    }

    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InvalidConfig(msg) => {
                crate::engine_error!("galaxy3d::AreaSystem", "Invalid configuration: {}", msg);
            }
            Error::InvalidGroup(msg) => {
                crate::engine_error!("galaxy3d::AreaSystem", "Invalid group: {}", msg);
            }
        }
        error
    }

    pub fn config(&self) -> &AreaSystemConfig {
        &self.config
    }

    // ===== GROUPS =====

    /// Create a group. Areas, user-id lookups, and visibility lists are per group.
    pub fn add_group(&mut self) -> GroupKey {
        let key = self.groups.insert(GroupState::default());
        self.visibility.add_group(key);
        key
    }

    /// Remove an empty group. Removing a stale key is ignored with a warning.
    ///
    /// # Panics
    ///
    /// Panics if the group still owns areas.
    pub fn remove_group(&mut self, group: GroupKey) {
        if let Some(state) = self.groups.remove(group) {
            assert!(
                state.area_count == 0,
                "removing a group that still owns {} areas", state.area_count
            );
            self.visibility.remove_group(group);
        } else {
            crate::engine_warn!("galaxy3d::AreaSystem", "Ignoring removal of stale group {:?}", group);
        }
    }

    /// Visibility lists of a group, `None` if the key is stale
    pub fn group(&self, group: GroupKey) -> Option<&GroupVisibility> {
        self.visibility.group(group)
    }

    /// Visibility lists of a group
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidGroup` if the key does not refer to a live group.
    pub fn try_group(&self, group: GroupKey) -> Result<&GroupVisibility> {
        self.visibility.group(group).ok_or_else(|| Self::log_and_return_error(
            Error::InvalidGroup(format!("{:?} does not refer to a live group", group))
        ))
    }

    /// Area registered under `user_id` in `group`
    pub fn find_area(&self, group: GroupKey, user_id: u32) -> Option<AreaId> {
        self.groups.get(group)?.users.get(&user_id).copied()
    }

    // ===== BOX AREAS =====

    pub fn add_box_area(&mut self, group: GroupKey, user_id: u32, bounds: &Aabb, flags: AreaFlags) -> AreaId {
        let id = self.allocate(group, user_id, flags, ShapeKind::Box, None, None);
        self.insert_box(id, bounds);
        id
    }

    /// Add a box given in local space; stored as the AABB of its transformed corners
    pub fn add_box_area_transformed(
        &mut self,
        group: GroupKey,
        user_id: u32,
        bounds: &Aabb,
        transform: &Mat4,
        flags: AreaFlags,
    ) -> AreaId {
        self.add_box_area(group, user_id, &bounds.transformed(transform), flags)
    }

    /// Move or resize a box area. Id, group, user id, and flags are preserved.
    pub fn update_box_area(&mut self, id: AreaId, bounds: &Aabb) {
        let (record, node_id) = self.live_record(id, ShapeKind::Box);
        let bounds = self.config.clamp_box(bounds);

        if self.tree.node(node_id).is_valid_leaf(bounds.center(), bounds.max_extent()) {
            self.tree.node_mut(node_id).boxes[record.index as usize].bounds = bounds;
            self.tree.expand(node_id, &bounds);
            self.reoptimizer.enqueue(&mut self.tree, node_id);
        } else {
            self.detach_box(id, node_id);
            self.insert_box(id, &bounds);
            self.log_relocation(id, node_id);
        }
    }

    pub fn update_box_area_transformed(&mut self, id: AreaId, bounds: &Aabb, transform: &Mat4) {
        self.update_box_area(id, &bounds.transformed(transform));
    }

    pub fn remove_box_area(&mut self, id: AreaId) {
        let (_, node_id) = self.live_record(id, ShapeKind::Box);
        self.detach_box(id, node_id);
        self.release(id);
    }

    // ===== SPHERE AREAS =====

    pub fn add_sphere_area(&mut self, group: GroupKey, user_id: u32, bounds: &Sphere, flags: AreaFlags) -> AreaId {
        let id = self.allocate(group, user_id, flags, ShapeKind::Sphere, None, None);
        self.insert_sphere(id, bounds);
        id
    }

    /// Add a sphere given in local space; the radius scales by the largest axis scale
    pub fn add_sphere_area_transformed(
        &mut self,
        group: GroupKey,
        user_id: u32,
        bounds: &Sphere,
        transform: &Mat4,
        flags: AreaFlags,
    ) -> AreaId {
        self.add_sphere_area(group, user_id, &bounds.transformed(transform), flags)
    }

    /// Move or resize a sphere area. Id, group, user id, and flags are preserved.
    pub fn update_sphere_area(&mut self, id: AreaId, bounds: &Sphere) {
        let (record, node_id) = self.live_record(id, ShapeKind::Sphere);

        let origin = self.config.clamp_origin(bounds.origin);
        if self.tree.node(node_id).is_valid_leaf(origin, bounds.radius) {
            self.tree.node_mut(node_id).spheres[record.index as usize].bounds = *bounds;
            self.tree.expand(node_id, &bounds.aabb());
            self.reoptimizer.enqueue(&mut self.tree, node_id);
        } else {
            self.detach_sphere(id, node_id);
            self.insert_sphere(id, bounds);
            self.log_relocation(id, node_id);
        }
    }

    pub fn update_sphere_area_transformed(&mut self, id: AreaId, bounds: &Sphere, transform: &Mat4) {
        self.update_sphere_area(id, &bounds.transformed(transform));
    }

    pub fn remove_sphere_area(&mut self, id: AreaId) {
        let (_, node_id) = self.live_record(id, ShapeKind::Sphere);
        self.detach_sphere(id, node_id);
        self.release(id);
    }

    // ===== ENTITY-ATTACHED AREAS =====

    /// Add a box that follows `entity`: `local_bounds` is re-transformed on
    /// every `update_entity_transform`.
    pub fn add_entity_box_area(
        &mut self,
        group: GroupKey,
        user_id: u32,
        entity: EntityId,
        local_bounds: &Aabb,
        transform: &Mat4,
        flags: AreaFlags,
    ) -> AreaId {
        let local = LocalShape::Box(*local_bounds);
        let id = self.allocate(group, user_id, flags, ShapeKind::Box, Some(entity), Some(local));
        self.insert_box(id, &local_bounds.transformed(transform));
        self.entity_areas.entry(entity).or_default().push(id);
        id
    }

    /// Sphere counterpart of `add_entity_box_area`
    pub fn add_entity_sphere_area(
        &mut self,
        group: GroupKey,
        user_id: u32,
        entity: EntityId,
        local_bounds: &Sphere,
        transform: &Mat4,
        flags: AreaFlags,
    ) -> AreaId {
        let local = LocalShape::Sphere(*local_bounds);
        let id = self.allocate(group, user_id, flags, ShapeKind::Sphere, Some(entity), Some(local));
        self.insert_sphere(id, &local_bounds.transformed(transform));
        self.entity_areas.entry(entity).or_default().push(id);
        id
    }

    /// Re-place every area attached to `entity` under its new transform
    pub fn update_entity_transform(&mut self, entity: EntityId, transform: &Mat4) {
        let Some(areas) = self.entity_areas.get_mut(&entity).map(std::mem::take) else {
            return;
        };

        for &id in &areas {
            match self.records[id.slot()].local_shape {
                Some(LocalShape::Box(local)) => self.update_box_area(id, &local.transformed(transform)),
                Some(LocalShape::Sphere(local)) => self.update_sphere_area(id, &local.transformed(transform)),
                None => {}
            }
        }

        self.entity_areas.insert(entity, areas);
    }

    /// Areas currently attached to `entity`
    pub fn entity_areas(&self, entity: EntityId) -> &[AreaId] {
        self.entity_areas.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    // ===== KIND-AGNOSTIC ACCESS =====

    /// Remove an area of either shape
    pub fn remove_area(&mut self, id: AreaId) {
        match self.shape_kind(id) {
            Some(ShapeKind::Box) => self.remove_box_area(id),
            Some(ShapeKind::Sphere) => self.remove_sphere_area(id),
            None => panic!("removing {} which is not a live area", id),
        }
    }

    /// Shape of a live area, `None` if the id is free
    pub fn shape_kind(&self, id: AreaId) -> Option<ShapeKind> {
        self.records.get(id.slot()).and_then(|record| record.kind)
    }

    /// Identity of a live area
    pub fn area(&self, id: AreaId) -> Option<Area> {
        let record = self.records.get(id.slot())?;
        record.kind?;
        Some(Area { id, group: record.group, user_id: record.user_id, flags: record.flags })
    }

    /// Identity tuple of a live area, as found in visibility lists
    pub fn area_ids(&self, id: AreaId) -> Option<AreaIds> {
        self.area(id)?;
        Some(self.records[id.slot()].ids(id))
    }

    /// Stored world bounds of a live box area
    pub fn box_bounds(&self, id: AreaId) -> Option<Aabb> {
        let record = self.records.get(id.slot())?;
        if record.kind != Some(ShapeKind::Box) {
            return None;
        }
        let node = self.tree.node(record.node?);
        Some(node.boxes[record.index as usize].bounds)
    }

    /// Stored world bounds of a live sphere area
    pub fn sphere_bounds(&self, id: AreaId) -> Option<Sphere> {
        let record = self.records.get(id.slot())?;
        if record.kind != Some(ShapeKind::Sphere) {
            return None;
        }
        let node = self.tree.node(record.node?);
        Some(node.spheres[record.index as usize].bounds)
    }

    // ===== FRAME WORK =====

    /// Tighten a bounded number of stale node bounds.
    ///
    /// Returns the number of nodes recomputed.
    pub fn optimize(&mut self) -> usize {
        self.reoptimizer.optimize(&mut self.tree)
    }

    /// Append every area with matching flags that intersects `frustum`
    pub fn query_frustum(&self, out: &mut Vec<Area>, flags: AreaFlags, frustum: &Frustum) {
        self.tree.query(frustum, flags, &mut |leaf| out.push(leaf_area(leaf)));
    }

    /// `query_frustum`, with each area's world bounds (spheres as their enclosing box)
    pub fn query_frustum_bounds(&self, out: &mut Vec<AreaBounds>, flags: AreaFlags, frustum: &Frustum) {
        self.tree.query(frustum, flags, &mut |leaf| {
            out.push(match leaf {
                LeafRef::Box(leaf) => AreaBounds { area: leaf.area, bounds: leaf.bounds },
                LeafRef::Sphere(leaf) => AreaBounds { area: leaf.area, bounds: leaf.bounds.aabb() },
            });
        });
    }

    /// Append every area with matching flags hit by `ray` within `[t_min, t_max)`.
    ///
    /// Broad phase: hits are not sorted and every shape on the path is reported.
    pub fn cast_ray(&self, out: &mut Vec<Area>, flags: AreaFlags, ray: &Ray, t_min: f32, t_max: f32) {
        let segment = RaySegment { ray: FastRay::new(ray), t_min, t_max };
        self.tree.query(&segment, flags, &mut |leaf| out.push(leaf_area(leaf)));
    }

    /// Run a visibility pass: refresh every group's `visible` list and
    /// rebuild its `new_visible` / `new_invisible` deltas.
    pub fn update_visibility(&mut self, frustum: &Frustum, flags: AreaFlags) {
        self.visibility.begin_pass(self.ids.high_water_mark() as usize);

        let visibility = &mut self.visibility;
        self.tree.query(frustum, flags, &mut |leaf| visibility.mark(leaf_area(leaf).id));

        let records = &self.records;
        self.visibility.finish_pass(|id| records[id.slot()].ids(id));
    }

    /// Whether the area was visible in the last visibility pass
    pub fn is_area_visible(&self, id: AreaId) -> bool {
        self.visibility.is_visible(id)
    }

    // ===== INTROSPECTION =====

    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    pub fn root_count(&self) -> usize {
        self.tree.root_count()
    }

    pub fn area_count(&self) -> usize {
        self.ids.len() as usize
    }

    /// Nodes waiting in the reoptimization queues
    pub fn pending_optimizations(&self) -> usize {
        self.reoptimizer.pending()
    }

    /// No node bound is waiting to be tightened
    pub fn is_fully_optimized(&self) -> bool {
        self.reoptimizer.pending() == 0
    }

    /// Check that every node bound encloses its leaves and children, and
    /// that every non-empty child is flagged in its parent's mask.
    ///
    /// Returns the number of nodes checked.
    ///
    /// # Panics
    ///
    /// Panics on the first violation.
    pub fn validate_bounds(&self) -> usize {
        let mut checked = 0;
        for id in self.tree.node_ids() {
            let node = self.tree.node(id);
            let content = self.tree.exact_bounds(id);
            assert!(
                node.aabb.contains(&content),
                "node at depth {} around {:?}: bound {:?} does not enclose content {:?}",
                node.depth, node.static_origin, node.aabb, content
            );
            if let Some(first_child) = node.first_child {
                for octant in 0..8 {
                    let child = self.tree.node(first_child.child(octant));
                    assert!(
                        child.aabb.is_empty() || node.child_mask & (1 << octant) != 0,
                        "node at depth {} around {:?}: non-empty child {} missing from mask",
                        node.depth, node.static_origin, octant
                    );
                }
            }
            checked += 1;
        }
        checked
    }

    // ===== INTERNAL =====

    fn allocate(
        &mut self,
        group: GroupKey,
        user_id: u32,
        flags: AreaFlags,
        kind: ShapeKind,
        entity: Option<EntityId>,
        local_shape: Option<LocalShape>,
    ) -> AreaId {
        let state = self.groups.get_mut(group);
        assert!(state.is_some(), "adding an area to a removed group");
        let id = AreaId(self.ids.alloc());
        if let Some(state) = state {
            state.users.insert(user_id, id);
            state.area_count += 1;
        }

        let record = AreaRecord {
            node: None,
            index: 0,
            kind: Some(kind),
            group,
            user_id,
            flags,
            entity,
            local_shape,
        };
        if id.slot() == self.records.len() {
            self.records.push(record);
        } else {
            self.records[id.slot()] = record;
        }
        id
    }

    fn insert_box(&mut self, id: AreaId, bounds: &Aabb) {
        let bounds = self.config.clamp_box(bounds);
        let node_id = self.tree.place(bounds.center(), bounds.max_extent());
        let area = self.records[id.slot()].area(id);
        let index = self.tree.push_box(node_id, BoxLeaf { bounds, area });
        self.attach(id, node_id, index);
    }

    fn insert_sphere(&mut self, id: AreaId, bounds: &Sphere) {
        let origin = self.config.clamp_origin(bounds.origin);
        let node_id = self.tree.place(origin, bounds.radius);
        let area = self.records[id.slot()].area(id);
        let index = self.tree.push_sphere(node_id, SphereLeaf { bounds: *bounds, area });
        self.attach(id, node_id, index);
    }

    fn attach(&mut self, id: AreaId, node_id: NodeId, index: u32) {
        let record = &mut self.records[id.slot()];
        record.node = Some(node_id);
        record.index = index;
        self.reoptimizer.enqueue(&mut self.tree, node_id);
    }

    /// Swap-remove the box leaf and repoint the leaf that filled its slot
    fn detach_box(&mut self, id: AreaId, node_id: NodeId) {
        let index = self.records[id.slot()].index as usize;

        let node = self.tree.node_mut(node_id);
        node.boxes.swap_remove(index);
        if let Some(moved) = node.boxes.get(index) {
            self.records[moved.area.id.slot()].index = index as u32;
        }
        self.records[id.slot()].node = None;
        self.reoptimizer.enqueue(&mut self.tree, node_id);
    }

    /// Swap-remove the sphere leaf and repoint the leaf that filled its slot
    fn detach_sphere(&mut self, id: AreaId, node_id: NodeId) {
        let index = self.records[id.slot()].index as usize;

        let node = self.tree.node_mut(node_id);
        node.spheres.swap_remove(index);
        if let Some(moved) = node.spheres.get(index) {
            self.records[moved.area.id.slot()].index = index as u32;
        }
        self.records[id.slot()].node = None;
        self.reoptimizer.enqueue(&mut self.tree, node_id);
    }

    /// Drop every reference to a detached area and free its id
    fn release(&mut self, id: AreaId) {
        let record = self.records[id.slot()];
        self.visibility.forget(record.ids(id));

        if let Some(state) = self.groups.get_mut(record.group) {
            if state.users.get(&record.user_id) == Some(&id) {
                state.users.remove(&record.user_id);
            }
            state.area_count -= 1;
        }

        if let Some(entity) = record.entity {
            if let Some(areas) = self.entity_areas.get_mut(&entity) {
                if let Some(position) = areas.iter().position(|&area| area == id) {
                    areas.swap_remove(position);
                }
                if areas.is_empty() {
                    self.entity_areas.remove(&entity);
                }
            }
        }

        self.records[id.slot()] = AreaRecord::default();
        self.ids.free(id.index());
    }

    /// Record of a live area of the given kind, with the node holding its leaf
    fn live_record(&self, id: AreaId, kind: ShapeKind) -> (AreaRecord, NodeId) {
        let record = self.records.get(id.slot()).copied().unwrap_or_default();
        match (record.kind, record.node) {
            (Some(found), Some(node_id)) if found == kind => (record, node_id),
            _ => panic!("{} is not a live {:?} area (found {:?})", id, kind, record.kind),
        }
    }

    fn log_relocation(&self, id: AreaId, old_node: NodeId) {
        let Some(new_node) = self.records[id.slot()].node else {
            return;
        };
        if self.tree.root_of(old_node) != self.tree.root_of(new_node) {
            crate::engine_trace!(
                "galaxy3d::AreaSystem",
                "{} moved to root cell around {:?}",
                id, self.tree.node(self.tree.root_of(new_node)).static_origin
            );
        }
    }
}

impl Default for AreaSystem {
    fn default() -> Self {
        Self::with_valid_config(AreaSystemConfig::default())
    }
}

impl AreaRecord {
    fn area(&self, id: AreaId) -> Area {
        Area { id, group: self.group, user_id: self.user_id, flags: self.flags }
    }

    fn ids(&self, id: AreaId) -> AreaIds {
        AreaIds { area_id: id, group: self.group, user_id: self.user_id, entity: self.entity }
    }
}

#[inline]
fn leaf_area(leaf: LeafRef<'_>) -> Area {
    match leaf {
        LeafRef::Box(leaf) => leaf.area,
        LeafRef::Sphere(leaf) => leaf.area,
    }
}

#[cfg(test)]
#[path = "area_system_tests.rs"]
mod tests;
