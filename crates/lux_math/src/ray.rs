use crate::Vec3;

/// A ray in 3D space with an origin and a direction.
///
/// Directions are expected to be unit length; producers normalize before
/// handing rays to the raycaster, so `t` values are world-space distances.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        debug_assert!(!origin.is_nan() && !direction.is_nan(), "NaN ray");
        Self { origin, direction }
    }

    /// Create a ray, normalizing the direction.
    pub fn normalized(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction.normalize_or_zero())
    }

    /// Create a ray whose origin is pushed `bias` along `direction` from `from`.
    ///
    /// Secondary rays leave a surface this way so they do not re-hit it.
    pub fn offset(from: Vec3, direction: Vec3, bias: f32) -> Self {
        Self::new(from + direction * bias, direction)
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_normalized() {
        let ray = Ray::normalized(Vec3::ONE, Vec3::new(0.0, 3.0, 4.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!((ray.direction.z - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_ray_offset() {
        let ray = Ray::offset(Vec3::ZERO, Vec3::Y, 0.01);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.01, 0.0));
        assert_eq!(ray.direction, Vec3::Y);
    }
}
