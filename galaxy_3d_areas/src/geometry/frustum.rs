/// Frustum - six clipping planes for visibility culling.
///
/// Each plane is represented as a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing normal
/// - D is the signed distance
/// - A point P is inside the frustum if dot(plane, P_homogeneous) >= 0 for all planes
///
/// The caller computes the frustum (usually from the camera's view-projection
/// matrix) and hands it to area queries and visibility passes.

use glam::{Mat4, Vec3, Vec4};
use super::bounds::{Aabb, Sphere};

/// Result of a 3-way volume/AABB classification.
///
/// Drives hierarchical pruning in area queries:
/// - `Outside` → skip the entire subtree
/// - `Inside` → report every matching leaf without per-shape tests
/// - `Partial` → test leaves individually and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// AABB is entirely outside the volume
    Outside,
    /// AABB is entirely inside the volume
    Inside,
    /// AABB partially overlaps the volume
    Partial,
}

/// Six frustum planes for culling.
///
/// Normal (A, B, C) points inward (toward the visible volume).
/// Works with both perspective and orthographic projections.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method (0..1 depth range, as produced by
    /// glam's `perspective_rh` / `orthographic_rh`).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        Self::from_planes([
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near (z >= 0)
            r3 - r2, // far
        ])
    }

    /// Build a frustum from raw inward planes, normalizing each one.
    pub fn from_planes(mut planes: [Vec4; 6]) -> Self {
        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }
        Self { planes }
    }

    /// Box-shaped "frustum" covering exactly `aabb`.
    ///
    /// Handy for region queries (editor selection, trigger sweeps) that
    /// should go through the same culling path as cameras.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::from_planes([
            Vec4::new(1.0, 0.0, 0.0, -aabb.min.x),
            Vec4::new(-1.0, 0.0, 0.0, aabb.max.x),
            Vec4::new(0.0, 1.0, 0.0, -aabb.min.y),
            Vec4::new(0.0, -1.0, 0.0, aabb.max.y),
            Vec4::new(0.0, 0.0, 1.0, -aabb.min.z),
            Vec4::new(0.0, 0.0, -1.0, aabb.max.z),
        ])
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// Uses the "positive vertex" test: for each plane, find the AABB corner
    /// most in the direction of the plane normal. If that corner is outside,
    /// the AABB is fully outside.
    ///
    /// May return false positives (conservative), never false negatives.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let normal = plane.truncate();
            let p_vertex = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return false;
            }
        }

        true
    }

    /// Test if a sphere intersects this frustum.
    ///
    /// Rejects when the center is farther than `radius` behind any plane.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.planes.iter().all(|plane| {
            plane.truncate().dot(sphere.origin) + plane.w >= -sphere.radius
        })
    }

    /// Classify an AABB against the frustum (3-way test).
    ///
    /// - If the p-vertex is outside any plane → `Outside` (early out)
    /// - If the n-vertex is outside any plane → at least `Partial`
    /// - If all n-vertices are inside all planes → `Inside`
    pub fn classify_aabb(&self, aabb: &Aabb) -> Coverage {
        let mut all_inside = true;

        for plane in &self.planes {
            let normal = plane.truncate();
            let positive = normal.cmpge(Vec3::ZERO);

            let p_vertex = Vec3::select(positive, aabb.max, aabb.min);
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return Coverage::Outside;
            }

            let n_vertex = Vec3::select(positive, aabb.min, aabb.max);
            if normal.dot(n_vertex) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { Coverage::Inside } else { Coverage::Partial }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
