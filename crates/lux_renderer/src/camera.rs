//! Pinhole camera for primary ray generation.

use lux_math::{Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::sampling::gen_f32;

/// Camera placement and image settings.
///
/// Builders keep the cached viewport in sync, so a camera is always ready to
/// generate rays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CameraSettings", into = "CameraSettings")]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32, // Vertical field of view in degrees

    // Cached by initialize()
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

/// Serialized form of a [`Camera`]: only the user-facing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct CameraSettings {
    image_width: u32,
    image_height: u32,
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            image_width: 800,
            image_height: 600,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
        }
    }
}

impl From<CameraSettings> for Camera {
    fn from(s: CameraSettings) -> Self {
        let mut camera = Self {
            image_width: s.image_width,
            image_height: s.image_height,
            look_from: s.look_from,
            look_at: s.look_at,
            vup: s.vup,
            vfov: s.vfov,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
        };
        camera.initialize();
        camera
    }
}

impl From<Camera> for CameraSettings {
    fn from(c: Camera) -> Self {
        Self {
            image_width: c.image_width,
            image_height: c.image_height,
            look_from: c.look_from,
            look_at: c.look_at,
            vup: c.vup,
            vfov: c.vfov,
        }
    }
}

impl Camera {
    /// 800x600 camera at the origin looking down -Z with a 90° field of view.
    pub fn new() -> Self {
        CameraSettings::default().into()
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self.initialize();
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.initialize();
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self.initialize();
        self
    }

    pub fn position(&self) -> Vec3 {
        self.look_from
    }

    fn initialize(&mut self) {
        let width = self.image_width.max(1) as f32;
        let height = self.image_height.max(1) as f32;

        // Viewport one unit in front of the eye
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (width / height);

        // Camera basis
        let w = (self.look_from - self.look_at).normalize_or_zero();
        let u = self.vup.cross(w).normalize_or_zero();
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        self.pixel_delta_u = viewport_u / width;
        self.pixel_delta_v = viewport_v / height;

        let viewport_upper_left = self.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    /// Normalized ray through the centre of pixel (x, y); (0, 0) is top-left.
    pub fn ray_for_pixel(&self, x: u32, y: u32) -> Ray {
        self.ray_through(x as f32, y as f32)
    }

    /// Ray through a random point inside pixel (x, y), for supersampling.
    pub fn sample_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let dx = gen_f32(rng) - 0.5;
        let dy = gen_f32(rng) - 0.5;
        self.ray_through(x as f32 + dx, y as f32 + dy)
    }

    fn ray_through(&self, px: f32, py: f32) -> Ray {
        let pixel = self.pixel00_loc + px * self.pixel_delta_u + py * self.pixel_delta_v;
        Ray::normalized(self.look_from, pixel - self.look_from)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
