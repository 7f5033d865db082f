//! Lux Core - scene store for the ray tracer.
//!
//! This crate provides:
//!
//! - **Surface description**: `Material`
//! - **Primitives**: `Plane`, `Sphere`, `Triangle`
//! - **Lights**: `PointLight`
//! - **Scene store**: `Scene`, append-only while authoring, read-only while rendering
//!
//! # Example
//!
//! ```
//! use lux_core::{Material, Plane, PointLight, Scene, Sphere};
//! use lux_math::Vec3;
//!
//! let mut scene = Scene::with_background(Vec3::ZERO);
//! let grey = scene.add_material(Material::new(Vec3::splat(0.4)));
//! let red = scene.add_material(Material::new(Vec3::new(1.0, 0.0, 0.0)));
//!
//! scene.add_plane(Plane::new(Vec3::Y, 0.0, grey));
//! scene.add_sphere(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, red));
//! scene.add_point_light(PointLight::new(Vec3::new(0.0, 10.0, 0.0), Vec3::ONE, 1000.0));
//! scene.freeze();
//!
//! assert!(scene.validate().is_ok());
//! ```

pub mod light;
pub mod material;
pub mod primitives;
pub mod scene;

// Re-export commonly used types
pub use light::PointLight;
pub use material::{Color, Material};
pub use primitives::{Plane, Sphere, Triangle};
pub use scene::{Scene, SceneError, BACKGROUND_MATERIAL};
