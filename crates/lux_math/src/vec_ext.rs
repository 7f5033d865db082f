// Colour and shading helpers for glam::Vec3.
//
// A NaN reaching any of these means an upstream bug, so inputs are checked
// with debug assertions rather than handled.

use glam::Vec3;

/// Extension trait for Vec3 used as point, direction or RGB colour.
pub trait Vec3Ext {
    /// Component-wise product (colour filtering).
    fn hadamard(self, other: Vec3) -> Vec3;

    /// Mirror `self` about the surface `normal`: `v - 2 (v·n) n`.
    fn reflected(self, normal: Vec3) -> Vec3;

    /// Clamp every component to `[0, 1]`.
    fn saturate(self) -> Vec3;
}

#[inline]
fn check(v: Vec3) {
    debug_assert!(!v.is_nan(), "NaN vector component: {v:?}");
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn hadamard(self, other: Vec3) -> Vec3 {
        check(self);
        check(other);
        self * other
    }

    #[inline]
    fn reflected(self, normal: Vec3) -> Vec3 {
        check(self);
        check(normal);
        self - 2.0 * self.dot(normal) * normal
    }

    #[inline]
    fn saturate(self) -> Vec3 {
        check(self);
        self.clamp(Vec3::ZERO, Vec3::ONE)
    }
}
