//! Lux renderer: octree-accelerated recursive ray tracing on the CPU.
//!
//! A [`PreparedScene`] freezes a [`lux_core::Scene`] and builds its
//! [`Octree`]; a [`Raycaster`] shades rays against it with shadows, mirror
//! reflection and Fresnel refraction; [`render`] and [`render_parallel`] drive
//! a [`Camera`] over every pixel into an [`ImageBuffer`].
//!
//! ```no_run
//! use lux_core::{Color, Material, Plane, PointLight, Scene, Sphere};
//! use lux_math::Vec3;
//! use lux_renderer::{render_parallel, Camera, PreparedScene, RenderConfig};
//!
//! # fn main() -> Result<(), lux_renderer::RenderError> {
//! let mut scene = Scene::with_background(Color::ZERO);
//! let grey = scene.add_material(Material::new(Color::splat(0.5)));
//! scene.add_plane(Plane::new(Vec3::Y, 0.0, grey));
//! scene.add_sphere(Sphere::new(Vec3::new(0.0, 1.0, -4.0), 1.0, grey));
//! scene.add_point_light(PointLight::new(Vec3::new(0.0, 8.0, 0.0), Color::ONE, 2000.0));
//!
//! let config = RenderConfig::default();
//! let prepared = PreparedScene::new(scene, &config)?;
//! let camera = Camera::new()
//!     .with_resolution(320, 240)
//!     .with_position(Vec3::new(0.0, 1.5, 2.0), Vec3::new(0.0, 1.0, -4.0), Vec3::Y);
//! render_parallel(&prepared, &camera, &config).save_png("out.png")?;
//! # Ok(())
//! # }
//! ```

mod bucket;
mod camera;
mod error;
mod hittable;
mod octree;
mod overlap;
mod prepared;
mod raycast;
mod renderer;
mod sampling;

pub use bucket::{generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::Camera;
pub use error::RenderError;
pub use hittable::{closest_in, Hit, Hittable};
pub use octree::{Octree, OctreeConfig, OctreeError, OctreeNode, NO_CHILD};
pub use overlap::{sphere_overlaps_box, triangle_overlaps_box};
pub use prepared::PreparedScene;
pub use raycast::{fresnel, raycast, refract, HitPolicy, Raycaster, SURFACE_BIAS};
pub use renderer::{color_to_rgba, pack_pixel, render, render_pixel, ImageBuffer, PixelFormat, RenderConfig};
pub use sampling::{pixel_rng, pixel_seed, random_unit_vector};

/// Re-export the scene and math types renderer callers always need
pub use lux_core::{Color, Scene};
pub use lux_math::{Aabb, Interval, Ray, Vec3};
