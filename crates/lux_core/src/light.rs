//! Point lights.

use crate::Color;
use lux_math::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// An isotropic point light with inverse-square falloff.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    /// Colour of the emitted light (linear)
    pub emission: Color,
    /// Radiant intensity
    pub strength: f32,
}

impl PointLight {
    pub fn new(position: Vec3, emission: Color, strength: f32) -> Self {
        debug_assert!(!position.is_nan() && !emission.is_nan() && !strength.is_nan());
        Self {
            position,
            emission,
            strength,
        }
    }

    /// Light arriving at `distance`: `emission * strength / (4π d²)`.
    pub fn irradiance_at(&self, distance: f32) -> Color {
        self.emission * (self.strength / (4.0 * PI * distance * distance))
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.emission.is_finite() && self.strength.is_finite()
    }
}
