//! Area module
//!
//! Spatial index of box and sphere areas (loose octree over a sparse root
//! grid), amortized bounds reoptimization, frustum and ray queries, and
//! per-group visibility deltas.

mod types;
mod config;
mod spatial_tree;
mod reoptimizer;
mod query;
mod visibility;
mod area_system;

pub use types::{Area, AreaBounds, AreaFlags, AreaId, AreaIds, EntityId, GroupKey, ShapeKind};
pub use config::AreaSystemConfig;
pub use visibility::GroupVisibility;
pub use area_system::AreaSystem;
