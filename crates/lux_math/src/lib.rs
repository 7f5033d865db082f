// Re-export glam for convenience
pub use glam::*;

// Lux math types
mod aabb;
mod interval;
mod ray;
mod vec_ext;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vec_ext::Vec3Ext;

/// Threshold below which denominators are treated as zero (parallel rays, tangents).
pub const EPSILON: f32 = 1e-6;
