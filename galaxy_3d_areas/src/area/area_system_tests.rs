use glam::{Mat4, Quat, Vec3};
use super::*;

// ============================================================================
// TEST HELPERS
// ============================================================================

fn make_system() -> (AreaSystem, GroupKey) {
    let mut system = AreaSystem::default();
    let group = system.add_group();
    (system, group)
}

fn world() -> Frustum {
    Frustum::from_aabb(&Aabb::new(Vec3::splat(-10_000.0), Vec3::splat(10_000.0)))
}

fn region(min: Vec3, max: Vec3) -> Frustum {
    Frustum::from_aabb(&Aabb::new(min, max))
}

fn query_ids(system: &AreaSystem, flags: AreaFlags, frustum: &Frustum) -> Vec<AreaId> {
    let mut out = Vec::new();
    system.query_frustum(&mut out, flags, frustum);
    let mut ids: Vec<AreaId> = out.iter().map(|area| area.id).collect();
    ids.sort_unstable();
    ids
}

fn cube(center: Vec3, half: f32) -> Aabb {
    Aabb::from_center_extent(center, Vec3::splat(half))
}

/// Deterministic pseudo-random stream (64-bit LCG)
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    fn point(&mut self, spread: f32) -> Vec3 {
        Vec3::new(self.range(-spread, spread), self.range(-spread, spread), self.range(-spread, spread))
    }
}

/// Mix of boxes and spheres of every size class
fn populate(system: &mut AreaSystem, group: GroupKey, count: u32, rng: &mut Lcg) -> Vec<AreaId> {
    (0..count)
        .map(|i| {
            let center = rng.point(400.0);
            let size = match i % 3 {
                0 => rng.range(0.1, 4.0),
                1 => rng.range(8.0, 16.0),
                _ => rng.range(20.0, 90.0),
            };
            if i % 2 == 0 {
                system.add_box_area(group, i, &cube(center, size), AreaFlags::VISIBILITY)
            } else {
                system.add_sphere_area(group, i, &Sphere::new(center, size), AreaFlags::SHADOW)
            }
        })
        .collect()
}

fn drain(system: &mut AreaSystem) {
    while !system.is_fully_optimized() {
        system.optimize();
    }
}

fn assert_tight(system: &AreaSystem) {
    for id in system.tree.node_ids() {
        assert_eq!(system.tree.node(id).aabb, system.tree.exact_bounds(id));
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_rejects_invalid_config() {
    let config = AreaSystemConfig { padding_ratio: -1.0, ..AreaSystemConfig::default() };
    assert!(matches!(AreaSystem::new(config), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_new_system_is_empty() {
    let system = AreaSystem::new(AreaSystemConfig::default()).unwrap();
    assert_eq!(system.area_count(), 0);
    assert_eq!(system.node_count(), 0);
    assert_eq!(system.root_count(), 0);
    assert!(system.is_fully_optimized());
}

// ============================================================================
// Completeness
// ============================================================================

#[test]
fn test_world_query_returns_every_area_once() {
    let (mut system, group) = make_system();
    let mut rng = Lcg(7);
    let mut ids = populate(&mut system, group, 120, &mut rng);
    ids.sort_unstable();

    assert_eq!(query_ids(&system, AreaFlags::all(), &world()), ids);
    assert_eq!(system.area_count(), 120);

    let boxes: Vec<AreaId> = ids.iter().copied()
        .filter(|&id| system.shape_kind(id) == Some(ShapeKind::Box))
        .collect();
    assert_eq!(query_ids(&system, AreaFlags::VISIBILITY, &world()), boxes);
}

#[test]
fn test_long_ray_hits_every_area_on_its_line() {
    let (mut system, group) = make_system();
    let on_line: Vec<AreaId> = (0..10)
        .map(|i| system.add_box_area(group, i, &cube(Vec3::new(i as f32 * 50.0, 3.0, 3.0), 1.0), AreaFlags::EDITOR_PICK))
        .collect();
    system.add_sphere_area(group, 99, &Sphere::new(Vec3::new(100.0, 50.0, 3.0), 2.0), AreaFlags::EDITOR_PICK);

    let mut out = Vec::new();
    let ray = Ray::new(Vec3::new(-10.0, 3.0, 3.0), Vec3::X);
    system.cast_ray(&mut out, AreaFlags::EDITOR_PICK, &ray, 0.0, f32::INFINITY);

    let mut hits: Vec<AreaId> = out.iter().map(|area| area.id).collect();
    hits.sort_unstable();
    assert_eq!(hits, on_line);

    // Truncated range stops before the later boxes
    out.clear();
    system.cast_ray(&mut out, AreaFlags::EDITOR_PICK, &ray, 0.0, 100.0);
    assert_eq!(out.len(), 2);
}

#[test]
fn test_query_bounds_reports_sphere_as_box() {
    let (mut system, group) = make_system();
    let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
    let id = system.add_sphere_area(group, 5, &sphere, AreaFlags::VISIBILITY);

    let mut out = Vec::new();
    system.query_frustum_bounds(&mut out, AreaFlags::all(), &world());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].area.id, id);
    assert_eq!(out[0].area.user_id, 5);
    assert_eq!(out[0].bounds, sphere.aabb());
}

// ============================================================================
// Bounds maintenance
// ============================================================================

#[test]
fn test_bounds_sound_before_optimize() {
    let (mut system, group) = make_system();
    let mut rng = Lcg(11);
    let ids = populate(&mut system, group, 80, &mut rng);

    for &id in ids.iter().step_by(3) {
        match system.shape_kind(id) {
            Some(ShapeKind::Box) => system.update_box_area(id, &cube(rng.point(400.0), rng.range(0.1, 30.0))),
            Some(ShapeKind::Sphere) => system.update_sphere_area(id, &Sphere::new(rng.point(400.0), rng.range(0.1, 30.0))),
            None => unreachable!(),
        }
    }
    for &id in ids.iter().skip(1).step_by(5) {
        system.remove_area(id);
    }

    assert_eq!(system.validate_bounds(), system.node_count());
}

#[test]
fn test_bounds_tight_after_quiescence() {
    let (mut system, group) = make_system();
    let mut rng = Lcg(23);
    let ids = populate(&mut system, group, 60, &mut rng);
    for &id in ids.iter().step_by(2) {
        system.remove_area(id);
    }

    drain(&mut system);
    assert_tight(&system);
    assert_eq!(system.validate_bounds(), system.node_count());
}

#[test]
fn test_query_just_missing_content_misses_after_optimize() {
    let (mut system, group) = make_system();
    let id = system.add_box_area(group, 1, &cube(Vec3::new(10.0, 10.0, 10.0), 0.5), AreaFlags::VISIBILITY);
    system.update_box_area(id, &cube(Vec3::new(20.0, 10.0, 10.0), 0.5));

    // The stale bound still covers the old position
    let root = system.tree.roots().next().unwrap();
    assert!(system.tree.node(root).aabb.contains(&cube(Vec3::splat(10.0), 0.5)));
    let old_spot = region(Vec3::splat(9.0), Vec3::splat(11.0));
    assert!(query_ids(&system, AreaFlags::all(), &old_spot).is_empty());

    drain(&mut system);
    for root in system.tree.roots() {
        assert_eq!(system.tree.node(root).aabb, cube(Vec3::new(20.0, 10.0, 10.0), 0.5));
    }
    let near_miss = region(Vec3::new(20.6, 9.0, 9.0), Vec3::new(22.0, 11.0, 11.0));
    assert_eq!(system.tree.node(system.tree.roots().next().unwrap()).aabb.max.x, 20.5);
    assert!(query_ids(&system, AreaFlags::all(), &near_miss).is_empty());
}

#[test]
fn test_optimize_is_bounded_per_call() {
    let config = AreaSystemConfig { optimize_quotas: vec![1], ..AreaSystemConfig::default() };
    let mut system = AreaSystem::new(config).unwrap();
    let group = system.add_group();
    let mut rng = Lcg(3);
    populate(&mut system, group, 30, &mut rng);

    let pending = system.pending_optimizations();
    assert!(pending > 3);
    assert!(system.optimize() <= 3);
    assert!(!system.is_fully_optimized());
}

#[test]
fn test_node_count_never_decreases() {
    let (mut system, group) = make_system();
    let mut rng = Lcg(5);
    let ids = populate(&mut system, group, 40, &mut rng);
    let nodes = system.node_count();

    for id in ids {
        system.remove_area(id);
    }
    drain(&mut system);
    assert_eq!(system.node_count(), nodes);
    assert_eq!(system.area_count(), 0);
    assert!(query_ids(&system, AreaFlags::all(), &world()).is_empty());
}

// ============================================================================
// Ids and records
// ============================================================================

#[test]
fn test_id_recycling_is_lifo() {
    let (mut system, group) = make_system();
    let a = system.add_box_area(group, 0, &cube(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY);
    let _b = system.add_box_area(group, 1, &cube(Vec3::ONE, 1.0), AreaFlags::VISIBILITY);
    let c = system.add_sphere_area(group, 2, &Sphere::new(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY);

    system.remove_box_area(a);
    system.remove_sphere_area(c);

    assert_eq!(system.add_box_area(group, 3, &cube(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY), c);
    assert_eq!(system.add_box_area(group, 4, &cube(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY), a);
}

#[test]
fn test_swap_remove_keeps_records_consistent() {
    let (mut system, group) = make_system();
    let ids: Vec<AreaId> = (0..8)
        .map(|i| system.add_box_area(group, i, &cube(Vec3::new(2.0 + i as f32, 2.0, 2.0), 0.25), AreaFlags::VISIBILITY))
        .collect();

    system.remove_box_area(ids[0]);
    system.remove_box_area(ids[3]);

    for (i, &id) in ids.iter().enumerate() {
        if i == 0 || i == 3 {
            assert_eq!(system.box_bounds(id), None);
        } else {
            assert_eq!(system.box_bounds(id), Some(cube(Vec3::new(2.0 + i as f32, 2.0, 2.0), 0.25)));
        }
    }

    // The displaced areas can still be updated and removed
    system.update_box_area(ids[7], &cube(Vec3::new(3.0, 3.0, 3.0), 0.25));
    assert_eq!(system.box_bounds(ids[7]), Some(cube(Vec3::new(3.0, 3.0, 3.0), 0.25)));
    for &id in &ids[4..] {
        system.remove_box_area(id);
    }
    assert_eq!(system.area_count(), 2);
}

#[test]
fn test_area_identity_accessors() {
    let (mut system, group) = make_system();
    let flags = AreaFlags::VISIBILITY | AreaFlags::SHADOW;
    let id = system.add_sphere_area(group, 42, &Sphere::new(Vec3::ONE, 2.0), flags);

    assert_eq!(system.shape_kind(id), Some(ShapeKind::Sphere));
    assert_eq!(system.area(id), Some(Area { id, group, user_id: 42, flags }));
    assert_eq!(system.sphere_bounds(id), Some(Sphere::new(Vec3::ONE, 2.0)));
    assert_eq!(system.box_bounds(id), None);
    assert_eq!(system.find_area(group, 42), Some(id));

    system.remove_area(id);
    assert_eq!(system.shape_kind(id), None);
    assert_eq!(system.area(id), None);
    assert_eq!(system.find_area(group, 42), None);
}

// ============================================================================
// Updates and relocation
// ============================================================================

#[test]
fn test_small_move_updates_in_place() {
    let (mut system, group) = make_system();
    let id = system.add_box_area(group, 0, &cube(Vec3::new(10.0, 10.0, 10.0), 0.5), AreaFlags::VISIBILITY);
    let node = system.records[id.slot()].node;
    let nodes = system.node_count();

    system.update_box_area(id, &cube(Vec3::new(12.0, 11.0, 9.0), 0.5));
    assert_eq!(system.records[id.slot()].node, node);
    assert_eq!(system.node_count(), nodes);
}

#[test]
fn test_relocation_preserves_identity() {
    let (mut system, group) = make_system();
    let flags = AreaFlags::SHADOW | AreaFlags::EDITOR_PICK;
    let id = system.add_box_area(group, 9, &cube(Vec3::new(10.0, 10.0, 10.0), 0.5), flags);

    system.update_box_area(id, &cube(Vec3::new(-500.0, 10.0, 300.0), 6.0));
    assert_eq!(system.root_count(), 2);

    let old_spot = region(Vec3::splat(5.0), Vec3::splat(15.0));
    let new_spot = region(Vec3::new(-510.0, 0.0, 290.0), Vec3::new(-490.0, 20.0, 310.0));
    assert!(query_ids(&system, AreaFlags::all(), &old_spot).is_empty());
    assert_eq!(query_ids(&system, AreaFlags::all(), &new_spot), vec![id]);
    assert_eq!(system.area(id), Some(Area { id, group, user_id: 9, flags }));
}

#[test]
fn test_growing_sphere_moves_up_a_level() {
    let (mut system, group) = make_system();
    let id = system.add_sphere_area(group, 0, &Sphere::new(Vec3::splat(10.0), 1.0), AreaFlags::VISIBILITY);
    let small_node = system.records[id.slot()].node;

    system.update_sphere_area(id, &Sphere::new(Vec3::splat(10.0), 40.0));
    let large_node = system.records[id.slot()].node.unwrap();
    assert_ne!(Some(large_node), small_node);
    assert_eq!(system.tree.node(large_node).depth, 0);
    assert_eq!(system.sphere_bounds(id), Some(Sphere::new(Vec3::splat(10.0), 40.0)));
}

#[test]
fn test_vertical_band_clamps_boxes() {
    let config = AreaSystemConfig { vertical_band: Some((-2.0, 8.0)), ..AreaSystemConfig::default() };
    let mut system = AreaSystem::new(config).unwrap();
    let group = system.add_group();

    let id = system.add_box_area(group, 0, &Aabb::new(Vec3::new(0.0, -50.0, 0.0), Vec3::new(1.0, 50.0, 1.0)), AreaFlags::VISIBILITY);
    let stored = system.box_bounds(id).unwrap();
    assert_eq!(stored.min.y, -2.0);
    assert_eq!(stored.max.y, 8.0);

    let above = region(Vec3::new(-1.0, 20.0, -1.0), Vec3::new(2.0, 30.0, 2.0));
    assert!(query_ids(&system, AreaFlags::all(), &above).is_empty());
}

#[test]
fn test_transformed_variants() {
    let (mut system, group) = make_system();
    let transform = Mat4::from_scale_rotation_translation(
        Vec3::splat(2.0),
        Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        Vec3::new(100.0, 0.0, 0.0),
    );

    let local_box = cube(Vec3::ZERO, 1.0);
    let box_id = system.add_box_area_transformed(group, 0, &local_box, &transform, AreaFlags::VISIBILITY);
    let stored = system.box_bounds(box_id).unwrap();
    assert!((stored.center() - Vec3::new(100.0, 0.0, 0.0)).length() < 1e-4);
    assert!((stored.max_extent() - 2.0).abs() < 1e-4);

    let local_sphere = Sphere::new(Vec3::ZERO, 1.5);
    let sphere_id = system.add_sphere_area_transformed(group, 1, &local_sphere, &transform, AreaFlags::VISIBILITY);
    let stored = system.sphere_bounds(sphere_id).unwrap();
    assert!((stored.radius - 3.0).abs() < 1e-4);

    system.update_sphere_area_transformed(sphere_id, &local_sphere, &Mat4::from_translation(Vec3::Y * 5.0));
    assert_eq!(system.sphere_bounds(sphere_id), Some(Sphere::new(Vec3::Y * 5.0, 1.5)));

    system.update_box_area_transformed(box_id, &local_box, &Mat4::IDENTITY);
    assert_eq!(system.box_bounds(box_id), Some(local_box));
}

// ============================================================================
// Entity-attached areas
// ============================================================================

#[test]
fn test_entity_transform_moves_attached_areas() {
    let (mut system, group) = make_system();
    let start = Mat4::from_translation(Vec3::new(10.0, 0.0, 10.0));
    let body = system.add_entity_box_area(group, 0, 77, &cube(Vec3::ZERO, 1.0), &start, AreaFlags::VISIBILITY);
    let aura = system.add_entity_sphere_area(group, 1, 77, &Sphere::new(Vec3::ZERO, 4.0), &start, AreaFlags::SHADOW);
    let other = system.add_box_area(group, 2, &cube(Vec3::new(10.0, 0.0, 10.0), 1.0), AreaFlags::VISIBILITY);

    assert_eq!(system.entity_areas(77), &[body, aura]);
    assert_eq!(system.area_ids(body).unwrap().entity, Some(77));
    assert_eq!(system.area_ids(other).unwrap().entity, None);

    system.update_entity_transform(77, &Mat4::from_translation(Vec3::new(-300.0, 0.0, 0.0)));
    assert_eq!(system.box_bounds(body), Some(cube(Vec3::new(-300.0, 0.0, 0.0), 1.0)));
    assert_eq!(system.sphere_bounds(aura), Some(Sphere::new(Vec3::new(-300.0, 0.0, 0.0), 4.0)));
    assert_eq!(system.box_bounds(other), Some(cube(Vec3::new(10.0, 0.0, 10.0), 1.0)));
    assert_eq!(system.entity_areas(77).len(), 2);
}

#[test]
fn test_removal_detaches_from_entity() {
    let (mut system, group) = make_system();
    let id = system.add_entity_box_area(group, 0, 5, &cube(Vec3::ZERO, 1.0), &Mat4::IDENTITY, AreaFlags::VISIBILITY);

    system.remove_area(id);
    assert!(system.entity_areas(5).is_empty());

    // No longer attached: unknown entities are ignored
    system.update_entity_transform(5, &Mat4::from_translation(Vec3::X));
    assert_eq!(system.area_count(), 0);
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn test_user_ids_are_scoped_per_group() {
    let (mut system, first) = make_system();
    let second = system.add_group();
    let a = system.add_box_area(first, 1, &cube(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY);
    let b = system.add_box_area(second, 1, &cube(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY);

    assert_eq!(system.find_area(first, 1), Some(a));
    assert_eq!(system.find_area(second, 1), Some(b));
    assert_eq!(system.find_area(first, 2), None);
}

#[test]
fn test_try_group_on_removed_group() {
    let (mut system, _) = make_system();
    let group = system.add_group();
    assert!(system.try_group(group).is_ok());

    system.remove_group(group);
    assert!(system.group(group).is_none());
    assert!(matches!(system.try_group(group), Err(Error::InvalidGroup(_))));
    assert_eq!(system.find_area(group, 0), None);
}

#[test]
#[should_panic(expected = "still owns")]
fn test_remove_non_empty_group_panics() {
    let (mut system, group) = make_system();
    system.add_box_area(group, 0, &cube(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY);
    system.remove_group(group);
}

// ============================================================================
// Contract violations
// ============================================================================

#[test]
#[should_panic(expected = "is not a live Sphere area")]
fn test_kind_mismatch_panics() {
    let (mut system, group) = make_system();
    let id = system.add_box_area(group, 0, &cube(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY);
    system.update_sphere_area(id, &Sphere::new(Vec3::ZERO, 1.0));
}

#[test]
#[should_panic(expected = "is not a live Box area")]
fn test_double_remove_panics() {
    let (mut system, group) = make_system();
    let id = system.add_box_area(group, 0, &cube(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY);
    system.remove_box_area(id);
    system.remove_box_area(id);
}

#[test]
#[should_panic(expected = "is not a live Sphere area")]
fn test_update_after_remove_panics() {
    let (mut system, group) = make_system();
    let id = system.add_sphere_area(group, 0, &Sphere::new(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY);
    system.remove_sphere_area(id);
    system.update_sphere_area(id, &Sphere::new(Vec3::ONE, 1.0));
}

#[test]
fn test_relocated_areas_detach_from_their_new_node() {
    let (mut system, group) = make_system();
    let moving_box = system.add_box_area(group, 0, &cube(Vec3::splat(10.0), 0.5), AreaFlags::VISIBILITY);
    let moving_ball = system.add_sphere_area(group, 1, &Sphere::new(Vec3::splat(10.0), 0.5), AreaFlags::VISIBILITY);
    let anchor = system.add_box_area(group, 2, &cube(Vec3::splat(12.0), 0.5), AreaFlags::VISIBILITY);

    // Hop across root cells, then remove from wherever the leaves ended up
    for hop in 1..=3 {
        let center = Vec3::splat(10.0 + hop as f32 * 200.0);
        system.update_box_area(moving_box, &cube(center, 0.5));
        system.update_sphere_area(moving_ball, &Sphere::new(center, 0.5));
    }
    system.remove_box_area(moving_box);
    system.remove_sphere_area(moving_ball);

    assert_eq!(query_ids(&system, AreaFlags::all(), &world()), vec![anchor]);
    assert_eq!(system.box_bounds(anchor), Some(cube(Vec3::splat(12.0), 0.5)));
    drain(&mut system);
    assert_eq!(system.validate_bounds(), system.node_count());
}

#[test]
#[should_panic(expected = "not a live area")]
fn test_remove_unknown_id_panics() {
    let (mut system, _) = make_system();
    system.remove_area(AreaId(12));
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn test_visibility_deltas_follow_camera() {
    let (mut system, group) = make_system();
    let near = system.add_box_area(group, 0, &cube(Vec3::new(5.0, 0.0, 0.0), 1.0), AreaFlags::VISIBILITY);
    let far = system.add_sphere_area(group, 1, &Sphere::new(Vec3::new(500.0, 0.0, 0.0), 1.0), AreaFlags::VISIBILITY);
    let _hidden = system.add_box_area(group, 2, &cube(Vec3::new(5.0, 0.0, 0.0), 1.0), AreaFlags::SHADOW);

    let view_near = region(Vec3::splat(-20.0), Vec3::splat(20.0));
    let view_far = region(Vec3::new(480.0, -20.0, -20.0), Vec3::new(520.0, 20.0, 20.0));

    system.update_visibility(&view_near, AreaFlags::VISIBILITY);
    let lists = system.try_group(group).unwrap();
    assert_eq!(lists.new_visible().len(), 1);
    assert_eq!(lists.new_visible()[0].area_id, near);
    assert!(system.is_area_visible(near));
    assert!(!system.is_area_visible(far));

    system.update_visibility(&view_near, AreaFlags::VISIBILITY);
    let lists = system.try_group(group).unwrap();
    assert!(lists.new_visible().is_empty());
    assert!(lists.new_invisible().is_empty());

    system.update_visibility(&view_far, AreaFlags::VISIBILITY);
    let lists = system.try_group(group).unwrap();
    assert_eq!(lists.new_visible()[0].area_id, far);
    assert_eq!(lists.new_invisible()[0].area_id, near);
    assert_eq!(lists.visible().len(), 1);
}

#[test]
fn test_removing_visible_area_reports_invisible_next_pass() {
    let (mut system, group) = make_system();
    let a = system.add_box_area(group, 10, &cube(Vec3::ZERO, 1.0), AreaFlags::VISIBILITY);
    let b = system.add_box_area(group, 11, &cube(Vec3::ONE, 1.0), AreaFlags::VISIBILITY);
    let view = region(Vec3::splat(-5.0), Vec3::splat(5.0));
    system.update_visibility(&view, AreaFlags::VISIBILITY);

    system.remove_box_area(a);
    let lists = system.group(group).unwrap();
    assert_eq!(lists.visible().len(), 1);
    assert_eq!(lists.visible()[0].area_id, b);
    assert!(!system.is_area_visible(a));

    // The recycled id belongs to a new, not yet visible area
    let c = system.add_box_area(group, 12, &cube(Vec3::splat(900.0), 1.0), AreaFlags::VISIBILITY);
    assert_eq!(c, a);

    system.update_visibility(&view, AreaFlags::VISIBILITY);
    let lists = system.group(group).unwrap();
    assert_eq!(lists.new_invisible().len(), 1);
    assert_eq!(lists.new_invisible()[0].user_id, 10);
    assert!(lists.new_visible().is_empty());
}
