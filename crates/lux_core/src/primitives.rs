//! Geometric primitives stored by the scene.
//!
//! These are plain data; intersection lives in the renderer.

use lux_math::{Aabb, Vec3};
use serde::{Deserialize, Serialize};

/// An infinite plane in Hesse normal form: `normal · p = distance`.
///
/// Planes are unbounded and are never inserted into the octree.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal
    pub normal: Vec3,
    /// Signed distance from the origin along `normal`
    pub distance: f32,
    /// Index into the scene's materials
    pub material: usize,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32, material: usize) -> Self {
        debug_assert!(!normal.is_nan() && !distance.is_nan());
        Self {
            normal: normal.normalize_or_zero(),
            distance,
            material,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.normal.is_finite() && self.distance.is_finite()
    }
}

/// A sphere primitive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: usize,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: usize) -> Self {
        debug_assert!(!center.is_nan() && !radius.is_nan());
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Box spanned by the six axis-extreme surface points (±radius along x, y and z).
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.center - Vec3::splat(self.radius), self.center + Vec3::splat(self.radius))
    }

    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite()
    }
}

/// A triangle primitive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub material: usize,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: usize) -> Self {
        debug_assert!(!v0.is_nan() && !v1.is_nan() && !v2.is_nan());
        Self { v0, v1, v2, material }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// The two edges sharing `v0`.
    pub fn edges(&self) -> (Vec3, Vec3) {
        (self.v1 - self.v0, self.v2 - self.v0)
    }

    /// Geometric face normal, `normalize((v1 - v0) × (v2 - v0))`.
    ///
    /// Zero for degenerate (zero-area) triangles.
    pub fn normal(&self) -> Vec3 {
        let (e1, e2) = self.edges();
        e1.cross(e2).normalize_or_zero()
    }

    /// Box spanned by the three vertices.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.v0.min(self.v1).min(self.v2), self.v0.max(self.v1).max(self.v2))
    }

    pub fn is_finite(&self) -> bool {
        self.v0.is_finite() && self.v1.is_finite() && self.v2.is_finite()
    }
}
