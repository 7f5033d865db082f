//! CPU render driver.
//!
//! Maps every pixel to one or more camera rays, traces them with a
//! [`Raycaster`] and stores the clamped average in an [`ImageBuffer`].
//! Each pixel draws from its own RNG stream, so the image does not depend on
//! the order pixels are rendered in.

use std::path::Path;
use std::time::Instant;

use lux_core::Color;
use serde::{Deserialize, Serialize};

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::error::RenderError;
use crate::octree::OctreeConfig;
use crate::raycast::{HitPolicy, Raycaster};
use crate::sampling::pixel_rng;
use crate::{Camera, PreparedScene};

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Camera rays per pixel; 1 shoots through the pixel centre
    pub samples_per_pixel: u32,
    /// Maximum reflection/refraction recursion depth
    pub max_depth: u32,
    /// Random offset radius of shadow ray directions (0 = hard shadows)
    pub shadow_jitter: f32,
    /// Seed of the per-pixel RNG streams
    pub seed: u64,
    /// Accelerate sphere/triangle lookups with an octree
    pub use_octree: bool,
    pub hit_policy: HitPolicy,
    pub octree: OctreeConfig,
    /// Edge length of the square tiles used by the parallel renderer
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            max_depth: 5,
            shadow_jitter: 0.01,
            seed: 0,
            use_octree: true,
            hit_policy: HitPolicy::Tagged,
            octree: OctreeConfig::default(),
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Byte order of a packed 32-bit pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// `0xAARRGGBB`
    Argb8888,
    /// `0xAABBGGRR`, i.e. RGBA bytes in little-endian memory
    Abgr8888,
}

/// Convert a colour to 8-bit RGBA, clamping each channel to [0, 1].
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

/// Pack a colour into one opaque 32-bit pixel of `format`.
pub fn pack_pixel(color: Color, format: PixelFormat) -> u32 {
    let [r, g, b, a] = color_to_rgba(color).map(u32::from);
    match format {
        PixelFormat::Argb8888 => (a << 24) | (r << 16) | (g << 8) | b,
        PixelFormat::Abgr8888 => (a << 24) | (b << 16) | (g << 8) | r,
    }
}

/// Image buffer of linear colours, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgba(*c)).collect()
    }

    /// Convert to packed 32-bit pixels.
    pub fn to_packed(&self, format: PixelFormat) -> Vec<u32> {
        self.pixels.iter().map(|c| pack_pixel(*c, format)).collect()
    }

    /// Write the image as an 8-bit RGBA PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        image::save_buffer_with_format(
            path,
            &self.to_rgba(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Render a single pixel, averaging `samples_per_pixel` clamped traces.
pub fn render_pixel(raycaster: &Raycaster, camera: &Camera, x: u32, y: u32, config: &RenderConfig) -> Color {
    let mut rng = pixel_rng(config.seed, x, y);

    if config.samples_per_pixel <= 1 {
        return raycaster.trace(&camera.ray_for_pixel(x, y), &mut rng);
    }

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let ray = camera.sample_ray(x, y, &mut rng);
        pixel_color += raycaster.trace(&ray, &mut rng);
    }
    pixel_color / config.samples_per_pixel as f32
}

/// Render the entire scene on the calling thread.
pub fn render(scene: &PreparedScene, camera: &Camera, config: &RenderConfig) -> ImageBuffer {
    let start = Instant::now();
    let raycaster = scene.raycaster(config);
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(&raycaster, camera, x, y, config);
            image.set(x, y, color);
        }
    }

    log::info!(
        "Rendered {}x{} ({} spp) in {:?}",
        image.width,
        image.height,
        config.samples_per_pixel,
        start.elapsed()
    );
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_core::{Material, Plane, PointLight, Scene, Sphere};
    use lux_math::Vec3;

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Color::new(2.0, -1.0, 0.5)), [255, 0, 127, 255]);
    }

    #[test]
    fn test_pixel_formats_differ_in_byte_order() {
        let red = Color::new(1.0, 0.0, 0.0);
        assert_eq!(pack_pixel(red, PixelFormat::Argb8888), 0xFFFF_0000);
        assert_eq!(pack_pixel(red, PixelFormat::Abgr8888), 0xFF00_00FF);

        // Abgr8888 is RGBA in little-endian memory
        let color = Color::new(0.2, 0.4, 0.6);
        let packed = pack_pixel(color, PixelFormat::Abgr8888);
        assert_eq!(packed.to_le_bytes(), color_to_rgba(color));
    }

    #[test]
    fn test_config_defaults_and_partial_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "max_depth": 3, "octree": { "min_elements": 8 } }"#).unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.samples_per_pixel, 1);
        assert_eq!(config.octree.min_elements, 8);
        assert_eq!(config.octree.max_depth, 10);
        assert_eq!(config.hit_policy, HitPolicy::Tagged);
        assert!(config.use_octree);
    }

    #[test]
    fn test_render_pixel_hits_sphere() {
        let mut scene = Scene::with_background(Color::new(0.0, 0.0, 0.3));
        let red = scene.add_material(Material::new(Color::new(1.0, 0.0, 0.0)));
        scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, red));
        scene.add_point_light(PointLight::new(Vec3::new(0.0, 0.0, 2.0), Color::ONE, 500.0));
        let prepared = PreparedScene::new(scene, &RenderConfig::default()).unwrap();

        let camera = Camera::new().with_resolution(11, 11);
        let config = RenderConfig {
            samples_per_pixel: 4,
            ..Default::default()
        };
        let raycaster = prepared.raycaster(&config);

        let center = render_pixel(&raycaster, &camera, 5, 5, &config);
        assert!(center.x > 0.0);
        assert_eq!(center.z, 0.0);

        let corner = render_pixel(&raycaster, &camera, 0, 0, &config);
        assert!((corner - Color::new(0.0, 0.0, 0.3)).length() < 1e-6);
    }

    #[test]
    fn test_render_fills_buffer() {
        let mut scene = Scene::with_background(Color::ZERO);
        let grey = scene.add_material(Material::new(Color::splat(0.5)));
        scene.add_plane(Plane::new(Vec3::Y, -1.0, grey));
        scene.add_point_light(PointLight::new(Vec3::new(0.0, 5.0, -2.0), Color::ONE, 200.0));
        let prepared = PreparedScene::new(scene, &RenderConfig::default()).unwrap();

        let camera = Camera::new().with_resolution(8, 6);
        let image = render(&prepared, &camera, &RenderConfig::default());

        assert_eq!(image.pixels.len(), 48);
        assert_eq!(image.to_rgba().len(), 48 * 4);
        // Top row looks above the horizon, bottom row sees the lit floor
        assert_eq!(image.get(4, 0), Color::ZERO);
        assert!(image.get(4, 5).x > 0.0);
        assert!(image.pixels.iter().all(|c| c.max_element() <= 1.0));
    }

    #[test]
    fn test_save_png() {
        let mut image = ImageBuffer::new(4, 2);
        image.set(1, 1, Color::ONE);
        let path = std::env::temp_dir().join("lux_renderer_test_save.png");
        image.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(loaded.get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!(loaded.get_pixel(0, 0).0, [0, 0, 0, 255]);
        let _ = std::fs::remove_file(path);
    }
}
