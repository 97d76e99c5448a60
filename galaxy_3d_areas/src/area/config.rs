/// AreaSystemConfig - tuning of the spatial grid, clamping, and reoptimization.

use glam::Vec3;
use crate::error::{Error, Result};
use crate::geometry::Aabb;

/// Configuration of an `AreaSystem`
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_areas::galaxy3d::area::{AreaSystem, AreaSystemConfig};
///
/// let config = AreaSystemConfig {
///     vertical_band: Some((-2.0, 8.0)),
///     ..AreaSystemConfig::default()
/// };
/// let system = AreaSystem::new(config)?;
/// # Ok::<(), galaxy_3d_areas::galaxy3d::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSystemConfig {
    /// Edge length of a root grid cell
    pub top_level_size: f32,
    /// Edge length at which cells stop splitting (deepest level)
    pub bottom_level_size: f32,
    /// `max_leaf_extent = unpadded_extent * padding_ratio` below the root level
    pub padding_ratio: f32,
    /// World position of the grid corner with key (0, 0, 0)
    pub grid_origin: Vec3,
    /// World floor/ceiling applied to areas before placement, if any
    pub vertical_band: Option<(f32, f32)>,
    /// Nodes reoptimized per `optimize()` call for depth 0, 1, 2, ...
    /// The last entry applies to every deeper level.
    pub optimize_quotas: Vec<u32>,
    /// Processed-prefix length after which a depth queue is compacted
    pub queue_compact_threshold: usize,
}

impl Default for AreaSystemConfig {
    fn default() -> Self {
        Self {
            top_level_size: 128.0,
            bottom_level_size: 32.0,
            padding_ratio: 0.5,
            grid_origin: Vec3::ZERO,
            vertical_band: None,
            optimize_quotas: vec![2, 8, 32, 64],
            queue_compact_threshold: 256,
        }
    }
}

impl AreaSystemConfig {
    /// Check the configuration for values the spatial tree cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = |value: f32| value.is_finite() && value > 0.0;

        if !positive(self.top_level_size) {
            return Err(Error::InvalidConfig(format!(
                "top_level_size must be finite and positive, got {}", self.top_level_size
            )));
        }
        if !positive(self.bottom_level_size) {
            return Err(Error::InvalidConfig(format!(
                "bottom_level_size must be finite and positive, got {}", self.bottom_level_size
            )));
        }
        if self.bottom_level_size > self.top_level_size {
            return Err(Error::InvalidConfig(format!(
                "bottom_level_size ({}) exceeds top_level_size ({})",
                self.bottom_level_size, self.top_level_size
            )));
        }
        if !positive(self.padding_ratio) {
            return Err(Error::InvalidConfig(format!(
                "padding_ratio must be finite and positive, got {}", self.padding_ratio
            )));
        }
        if !self.grid_origin.is_finite() {
            return Err(Error::InvalidConfig("grid_origin must be finite".to_string()));
        }
        if let Some((min_y, max_y)) = self.vertical_band {
            if !(min_y.is_finite() && max_y.is_finite() && min_y <= max_y) {
                return Err(Error::InvalidConfig(format!(
                    "vertical_band ({}, {}) must be finite with floor <= ceiling", min_y, max_y
                )));
            }
        }
        if self.optimize_quotas.is_empty() {
            return Err(Error::InvalidConfig("optimize_quotas must not be empty".to_string()));
        }
        if self.optimize_quotas.contains(&0) {
            return Err(Error::InvalidConfig(
                "optimize_quotas entries must be at least 1".to_string()
            ));
        }
        Ok(())
    }

    /// Number of tree levels (root = depth 0)
    pub fn level_count(&self) -> usize {
        let bottom_half = self.bottom_level_size * 0.5;
        let mut half = self.top_level_size * 0.5;
        let mut levels = 1;
        while half > bottom_half {
            half *= 0.5;
            levels += 1;
        }
        levels
    }

    /// Reoptimization quota for a depth
    pub fn quota_for_depth(&self, depth: usize) -> u32 {
        self.optimize_quotas
            .get(depth)
            .or(self.optimize_quotas.last())
            .copied()
            .unwrap_or(1)
    }

    pub(crate) fn clamp_box(&self, bounds: &Aabb) -> Aabb {
        match self.vertical_band {
            Some((min_y, max_y)) => bounds.clamp_vertical(min_y, max_y),
            None => *bounds,
        }
    }

    pub(crate) fn clamp_origin(&self, origin: Vec3) -> Vec3 {
        match self.vertical_band {
            Some((min_y, max_y)) => Vec3::new(origin.x, origin.y.clamp(min_y, max_y), origin.z),
            None => origin,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
