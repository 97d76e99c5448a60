/// Public value types of the area system: ids, flags, and query results.

use std::fmt;
use bitflags::bitflags;
use slotmap::new_key_type;
use crate::geometry::{Aabb, Sphere};

new_key_type! {
    /// Stable key of an area group (visibility lists and user-id lookups are per group).
    pub struct GroupKey;
}

/// Opaque entity handle supplied by the simulation layer.
pub type EntityId = u32;

/// Dense handle of an area.
///
/// Ids index the record array and the visibility bitset directly. They are
/// recycled most-recently-freed first once an area is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId(pub(crate) u32);

impl AreaId {
    /// Raw dense index
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "area#{}", self.0)
    }
}

bitflags! {
    /// Category flags of an area.
    ///
    /// Queries pass a mask; an area is reported only if its flags intersect
    /// the mask. Bits above the named ones are free for game-specific use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AreaFlags: u32 {
        /// Participates in camera visibility
        const VISIBILITY = 1 << 0;
        /// Pickable by editor rays
        const EDITOR_PICK = 1 << 1;
        /// Participates in shadow casting queries
        const SHADOW = 1 << 2;

        const _ = !0;
    }
}

/// Shape stored for an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Sphere,
}

/// Identity of an area as reported by queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Area {
    pub id: AreaId,
    pub group: GroupKey,
    pub user_id: u32,
    pub flags: AreaFlags,
}

/// Query result carrying the area's world bounds
///
/// Spheres are reported through their enclosing box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaBounds {
    pub area: Area,
    pub bounds: Aabb,
}

/// Identity tuple stored in per-group visibility lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaIds {
    pub area_id: AreaId,
    pub group: GroupKey,
    pub user_id: u32,
    /// Entity the area is attached to, if any
    pub entity: Option<EntityId>,
}

/// Local-space shape remembered for entity-attached areas
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LocalShape {
    Box(Aabb),
    Sphere(Sphere),
}
