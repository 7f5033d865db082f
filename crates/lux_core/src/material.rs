//! Surface description for the Whitted-style shading model.

use lux_math::Vec3;
use serde::{Deserialize, Serialize};

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// How a surface reflects, transmits and receives light.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Base colour, multiplied into everything the surface returns
    pub color: Color,

    /// Fraction of light that is mirror-reflected, in [0, 1]
    pub reflection_index: f32,

    /// 0 = opaque, > 0 = index of refraction (1.4 for glass)
    pub refraction_index: f32,

    /// Weight of the scene's ambient light
    pub ambient_weight: f32,

    /// Weight of the diffuse term of each point light
    pub diffuse_weight: f32,

    /// Weight of the specular term of each point light
    pub specular_weight: f32,

    /// Phong exponent of the specular term
    pub specular_exponent: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::new(0.5, 0.5, 0.5),
            reflection_index: 0.0,
            refraction_index: 0.0,
            ambient_weight: 0.0,
            diffuse_weight: 1.0,
            specular_weight: 0.0,
            specular_exponent: 1.0,
        }
    }
}

impl Material {
    /// A matte material with the given colour.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// A mirror that reflects `reflection_index` of the incoming light.
    pub fn mirror(color: Color, reflection_index: f32) -> Self {
        Self::new(color).with_reflection(reflection_index)
    }

    /// A transmissive material (glass, water) with the given index of refraction.
    pub fn dielectric(color: Color, refraction_index: f32) -> Self {
        Self {
            color,
            reflection_index: 1.0,
            refraction_index,
            diffuse_weight: 0.0,
            ..Default::default()
        }
    }

    pub fn with_reflection(mut self, reflection_index: f32) -> Self {
        self.reflection_index = reflection_index.clamp(0.0, 1.0);
        self
    }

    pub fn with_ambient(mut self, weight: f32) -> Self {
        self.ambient_weight = weight;
        self
    }

    pub fn with_diffuse(mut self, weight: f32) -> Self {
        self.diffuse_weight = weight;
        self
    }

    pub fn with_specular(mut self, weight: f32, exponent: f32) -> Self {
        self.specular_weight = weight;
        self.specular_exponent = exponent;
        self
    }

    /// True if rays continue through the surface.
    pub fn is_transmissive(&self) -> bool {
        self.refraction_index > 0.0
    }

    /// True if the surface spawns a mirror ray without being transmissive.
    pub fn is_reflective(&self) -> bool {
        self.reflection_index > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_defaults_are_matte() {
        let m = Material::new(Color::new(1.0, 0.0, 0.0));
        assert!(!m.is_transmissive());
        assert!(!m.is_reflective());
        assert_eq!(m.diffuse_weight, 1.0);
        assert_eq!(m.specular_weight, 0.0);
    }

    #[test]
    fn test_reflection_is_clamped() {
        assert_eq!(Material::mirror(Color::ONE, 1.7).reflection_index, 1.0);
        assert_eq!(Material::mirror(Color::ONE, -0.2).reflection_index, 0.0);
    }

    #[test]
    fn test_dielectric() {
        let glass = Material::dielectric(Color::ONE, 1.4);
        assert!(glass.is_transmissive());
        assert_eq!(glass.refraction_index, 1.4);
    }

    #[test]
    fn test_partial_material_from_json() {
        let m: Material =
            serde_json::from_str(r#"{ "color": [1.0, 0.6549, 0.1019], "specular_weight": 1.0 }"#)
                .unwrap();
        assert_eq!(m.color, Color::new(1.0, 0.6549, 0.1019));
        assert_eq!(m.specular_weight, 1.0);
        assert_eq!(m.diffuse_weight, 1.0);
        assert_eq!(m.refraction_index, 0.0);
    }
}
