/// Rays for broad-phase area picking.
///
/// `FastRay` caches the reciprocal direction so the slab test against the
/// many node bounds visited by a cast costs multiplies only.

use glam::Vec3;
use super::bounds::Sphere;

/// Ray with an unnormalized direction; `t` is measured in direction units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Ray with precomputed reciprocal direction
#[derive(Debug, Clone, Copy)]
pub struct FastRay {
    pub origin: Vec3,
    pub direction: Vec3,
    /// 1 / direction per axis (±inf on axes the ray is parallel to)
    pub inv_direction: Vec3,
}

impl FastRay {
    pub fn new(ray: &Ray) -> Self {
        Self {
            origin: ray.origin,
            direction: ray.direction,
            inv_direction: ray.direction.recip(),
        }
    }

    /// Slab test against `[min, max]`.
    ///
    /// Returns the entry parameter clamped to `t_min` when the ray overlaps
    /// the box somewhere in `[t_min, t_max)`, `None` otherwise. Inverted
    /// (empty) boxes never hit. Contact is inclusive: a ray running along a
    /// face plane hits the box.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3, t_min: f32, t_max: f32) -> Option<f32> {
        if min.cmpgt(max).any() {
            return None;
        }

        // Axes the ray is parallel to: decided by the origin alone, since
        // 0 * inf would poison the slab with NaN
        let parallel = self.direction.cmpeq(Vec3::ZERO);
        if (parallel & (self.origin.cmplt(min) | self.origin.cmpgt(max))).any() {
            return None;
        }

        let t1 = Vec3::select(parallel, Vec3::NEG_INFINITY, (min - self.origin) * self.inv_direction);
        let t2 = Vec3::select(parallel, Vec3::INFINITY, (max - self.origin) * self.inv_direction);

        let t_near = t1.min(t2).max_element().max(t_min);
        let t_far = t1.max(t2).min_element();

        if t_near <= t_far && t_near < t_max {
            Some(t_near)
        } else {
            None
        }
    }

    /// Analytic ray/sphere test with the same `[t_min, t_max)` contract.
    pub fn intersect_sphere(&self, sphere: &Sphere, t_min: f32, t_max: f32) -> Option<f32> {
        let offset = self.origin - sphere.origin;
        let a = self.direction.length_squared();
        let c = offset.length_squared() - sphere.radius * sphere.radius;

        if a == 0.0 {
            // Degenerate ray: a point, hit only if it sits in the sphere
            return (c <= 0.0 && t_min < t_max).then_some(t_min);
        }

        let half_b = self.direction.dot(offset);
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let t_enter = (-half_b - root) / a;
        let t_exit = (-half_b + root) / a;

        let t_near = t_enter.max(t_min);
        if t_near <= t_exit && t_near < t_max {
            Some(t_near)
        } else {
            None
        }
    }
}

impl From<Ray> for FastRay {
    fn from(ray: Ray) -> Self {
        FastRay::new(&ray)
    }
}

#[cfg(test)]
#[path = "ray_tests.rs"]
mod tests;
