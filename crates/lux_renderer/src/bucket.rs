//! Bucket-based parallel rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently on
//! the rayon thread pool and stitched back together.

use std::time::Instant;

use lux_core::Color;
use rayon::prelude::*;

use crate::raycast::Raycaster;
use crate::renderer::{render_pixel, ImageBuffer, RenderConfig};
use crate::{Camera, PreparedScene};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets closer to the center come first, so a progressive display shows
/// the middle of the frame early.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let distance = |b: &Bucket| {
        let (x, y) = b.center();
        (x - center_x).powi(2) + (y - center_y).powi(2)
    };

    // Stable sort keeps row-major order between equally distant buckets
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Render a single bucket; pixels come back in row-major order.
pub fn render_bucket(bucket: &Bucket, raycaster: &Raycaster, camera: &Camera, config: &RenderConfig) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = render_pixel(raycaster, camera, bucket.x + local_x, bucket.y + local_y, config);
            pixels.push(color);
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy the bucket's pixels into their place in `image`.
    pub fn write_into(&self, image: &mut ImageBuffer) {
        let width = self.bucket.width as usize;
        for (row, line) in self.pixels.chunks_exact(width.max(1)).enumerate() {
            for (col, color) in line.iter().enumerate() {
                image.set(self.bucket.x + col as u32, self.bucket.y + row as u32, *color);
            }
        }
    }
}

/// Render the entire scene on the rayon thread pool.
///
/// Produces exactly the same image as [`render`](crate::render) for the same
/// inputs.
pub fn render_parallel(scene: &PreparedScene, camera: &Camera, config: &RenderConfig) -> ImageBuffer {
    let start = Instant::now();
    let raycaster = scene.raycaster(config);
    let buckets = generate_buckets(camera.image_width, camera.image_height, config.bucket_size);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| BucketResult::new(*bucket, render_bucket(bucket, &raycaster, camera, config)))
        .collect();

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        result.write_into(&mut image);
    }

    log::info!(
        "Rendered {}x{} ({} spp) in {} buckets on {} threads in {:?}",
        image.width,
        image.height,
        config.samples_per_pixel,
        results.len(),
        rayon::current_num_threads(),
        start.elapsed()
    );
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render;
    use lux_core::{Material, Plane, PointLight, Scene, Sphere};
    use lux_math::Vec3;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4);

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4);

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9);

        // First bucket should be the center one
        assert_eq!((buckets[0].x, buckets[0].y), (64, 64));
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_empty_image_has_no_buckets() {
        assert!(generate_buckets(0, 10, 16).is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut scene = Scene::with_background(Color::new(0.1, 0.1, 0.2));
        let floor = scene.add_material(Material::new(Color::splat(0.6)).with_reflection(0.3));
        let glass = scene.add_material(Material::dielectric(Color::ONE, 1.4));
        let red = scene.add_material(Material::new(Color::new(0.9, 0.1, 0.1)).with_specular(0.5, 30.0));
        scene.add_plane(Plane::new(Vec3::Y, -1.0, floor));
        scene.add_sphere(Sphere::new(Vec3::new(-0.8, 0.0, -3.0), 0.8, glass));
        scene.add_sphere(Sphere::new(Vec3::new(0.9, -0.2, -4.0), 0.8, red));
        scene.add_point_light(PointLight::new(Vec3::new(2.0, 4.0, 0.0), Color::ONE, 300.0));

        let config = RenderConfig {
            samples_per_pixel: 2,
            shadow_jitter: 0.05,
            seed: 9,
            bucket_size: 7,
            ..Default::default()
        };
        let prepared = PreparedScene::new(scene, &config).unwrap();
        let camera = Camera::new().with_resolution(24, 18);

        let sequential = render(&prepared, &camera, &config);
        let parallel = render_parallel(&prepared, &camera, &config);
        assert_eq!(sequential, parallel);
    }
}
