//! Geometry module - bounding volumes, frustum, and rays.
//!
//! Passive value types consumed by the area system. The engine does not own
//! cameras: callers build a `Frustum` from their own view-projection matrix.

mod bounds;
mod frustum;
mod ray;

pub use bounds::{Aabb, Sphere};
pub use frustum::{Coverage, Frustum};
pub use ray::{FastRay, Ray};
