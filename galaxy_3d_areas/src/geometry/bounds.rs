/// Bounding volumes used to describe areas.
///
/// `Aabb` is stored as min/max corners. `Sphere` is origin + radius.
/// Both can be re-fit through an affine transform; boxes stay axis-aligned.

use glam::{Mat4, Vec3};

// ===== AABB =====

/// Axis-Aligned Bounding Box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl Aabb {
    /// Inverted box: identity for `union`, intersects nothing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Build a box from its center and half-size per axis.
    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        Self { min: center - extent, max: center + extent }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-size per axis.
    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Largest half-size; this is the scalar used to pick an octree level.
    pub fn max_extent(&self) -> f32 {
        self.extent().max_element()
    }

    /// True when min > max on any axis (e.g. `Aabb::EMPTY`).
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Smallest box enclosing both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Test if this AABB fully contains another AABB.
    ///
    /// An empty `other` is contained by everything.
    pub fn contains(&self, other: &Aabb) -> bool {
        if other.is_empty() {
            return true;
        }
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Test if this AABB intersects (overlaps or touches) another AABB.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Transform this box by a matrix, returning the enclosing world AABB.
    ///
    /// Uses the Arvo method: projects each matrix axis onto the box extents
    /// for an exact (tight) result without transforming all 8 corners.
    /// There is no oriented box support: the result is always re-fit.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        Aabb { min: new_min, max: new_max }
    }

    /// Clamp the vertical span into `[min_y, max_y]`.
    ///
    /// A box entirely above or below the band collapses onto the band edge.
    pub fn clamp_vertical(&self, min_y: f32, max_y: f32) -> Aabb {
        let mut result = *self;
        result.min.y = self.min.y.clamp(min_y, max_y);
        result.max.y = self.max.y.clamp(min_y, max_y);
        result
    }
}

// ===== SPHERE =====

/// Bounding sphere in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub origin: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(origin: Vec3, radius: f32) -> Self {
        Self { origin, radius }
    }

    /// Enclosing box of the sphere.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_extent(self.origin, Vec3::splat(self.radius))
    }

    /// Transform the sphere; the radius is scaled by the largest axis scale
    /// so non-uniform scaling stays conservative.
    pub fn transformed(&self, matrix: &Mat4) -> Sphere {
        let scale = matrix.col(0).truncate().length()
            .max(matrix.col(1).truncate().length())
            .max(matrix.col(2).truncate().length());
        Sphere {
            origin: matrix.transform_point3(self.origin),
            radius: self.radius * scale,
        }
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
