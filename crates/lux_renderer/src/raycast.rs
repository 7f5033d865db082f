//! Recursive Whitted-style raycaster.
//!
//! Shades a ray with direct lighting from point lights (with jittered shadow
//! rays), mirror reflection and Fresnel-weighted refraction, recursing until
//! `max_depth`. Colours are accumulated unclamped; only [`Raycaster::trace`]
//! clamps to `[0, 1]`.

use lux_core::{Color, Material, Scene, BACKGROUND_MATERIAL};
use lux_math::{Interval, Ray, Vec3, Vec3Ext, EPSILON};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::hittable::{closest_in, Hit};
use crate::octree::Octree;
use crate::sampling::random_unit_vector;

/// Distance secondary rays are pushed off the surface they leave.
pub const SURFACE_BIAS: f32 = 1e-3;

/// How a hit on the background material is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitPolicy {
    /// Hits are tagged results; material 0 is an ordinary material.
    #[default]
    Tagged,
    /// A hit on material 0 counts as a miss, for scenes authored against
    /// renderers that used material 0 as the no-hit sentinel.
    MaterialZeroIsMiss,
}

/// Fresnel reflectance for light arriving along `incident` at a surface with
/// outward `normal` and index of refraction `ior`.
///
/// The transmitted fraction is `1 - kr`. Returns 1 on total internal
/// reflection.
pub fn fresnel(incident: Vec3, normal: Vec3, ior: f32) -> f32 {
    let cosi = incident.dot(normal).clamp(-1.0, 1.0);
    let (etai, etat) = if cosi > 0.0 { (ior, 1.0) } else { (1.0, ior) };

    // Snell's law
    let sint = etai / etat * (1.0 - cosi * cosi).max(0.0).sqrt();
    if sint >= 1.0 {
        return 1.0;
    }

    let cost = (1.0 - sint * sint).max(0.0).sqrt();
    let cosi = cosi.abs();
    let rs = (etat * cosi - etai * cost) / (etat * cosi + etai * cost);
    let rp = (etai * cosi - etat * cost) / (etai * cosi + etat * cost);
    ((rs * rs + rp * rp) / 2.0).clamp(0.0, 1.0)
}

/// Refracted direction of `incident` through a surface with outward `normal`.
///
/// Rays arriving from inside (incident along the normal) leave the medium.
/// `None` on total internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, ior: f32) -> Option<Vec3> {
    let mut cosi = incident.dot(normal).clamp(-1.0, 1.0);
    let (mut etai, mut etat) = (1.0, ior);
    let mut n = normal;
    if cosi < 0.0 {
        cosi = -cosi;
    } else {
        std::mem::swap(&mut etai, &mut etat);
        n = -normal;
    }

    let eta = etai / etat;
    let k = 1.0 - eta * eta * (1.0 - cosi * cosi);
    if k < 0.0 {
        None
    } else {
        Some((eta * incident + (eta * cosi - k.sqrt()) * n).normalize_or_zero())
    }
}

/// Traces rays against one scene snapshot.
///
/// Cheap to construct; holds only borrows and settings, so one instance can
/// be shared by every render thread.
#[derive(Debug, Clone, Copy)]
pub struct Raycaster<'a> {
    scene: &'a Scene,
    octree: Option<&'a Octree>,
    max_depth: u32,
    shadow_jitter: f32,
    hit_policy: HitPolicy,
}

impl<'a> Raycaster<'a> {
    /// Raycaster over `scene`, using `octree` for spheres and triangles when
    /// given. `max_depth` bounds reflection/refraction recursion.
    pub fn new(scene: &'a Scene, octree: Option<&'a Octree>, max_depth: u32) -> Self {
        debug_assert!(
            octree.map_or(true, |o| o.matches(scene)),
            "octree was built from a different scene"
        );
        Self {
            scene,
            octree,
            max_depth,
            shadow_jitter: 0.0,
            hit_policy: HitPolicy::Tagged,
        }
    }

    /// Radius of the random offset added to shadow ray directions (0 = hard shadows).
    pub fn with_shadow_jitter(mut self, jitter: f32) -> Self {
        self.shadow_jitter = jitter.max(0.0);
        self
    }

    pub fn with_hit_policy(mut self, policy: HitPolicy) -> Self {
        self.hit_policy = policy;
        self
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Closest hit over planes (always brute force) and spheres/triangles
    /// (octree when available).
    pub fn closest_hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        let plane_hit = closest_in(self.scene.planes(), ray, ray_t);
        let range = ray_t.with_max(plane_hit.map_or(ray_t.max, |h| h.t));

        let bounded_hit = match self.octree {
            Some(octree) => octree.closest_hit(self.scene, ray, range),
            None => {
                let sphere_hit = closest_in(self.scene.spheres(), ray, range);
                let range = range.with_max(sphere_hit.map_or(range.max, |h| h.t));
                closest_in(self.scene.triangles(), ray, range).or(sphere_hit)
            }
        };

        let hit = bounded_hit.or(plane_hit);
        match self.hit_policy {
            HitPolicy::Tagged => hit,
            HitPolicy::MaterialZeroIsMiss => hit.filter(|h| h.material != BACKGROUND_MATERIAL),
        }
    }

    /// Colour seen along a primary ray, clamped to `[0, 1]`.
    pub fn trace(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        self.raycast(ray, 0, rng).saturate()
    }

    /// Unclamped colour seen along `ray` at recursion level `depth`.
    pub fn raycast(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        if depth >= self.max_depth {
            return Color::ZERO;
        }

        match self.closest_hit(ray, Interval::FORWARD) {
            Some(hit) => self.shade(ray, &hit, depth, rng),
            None => self.scene.background(),
        }
    }

    fn shade(&self, ray: &Ray, hit: &Hit, depth: u32, rng: &mut dyn RngCore) -> Color {
        let Some(material) = self.scene.material(hit.material) else {
            debug_assert!(false, "material {} out of range", hit.material);
            return Color::ZERO;
        };

        let point = ray.at(hit.t);
        let normal = hit.face_normal(ray);
        let mut color = Color::ZERO;

        if material.is_transmissive() {
            let kr = fresnel(ray.direction, hit.normal, material.refraction_index);
            let reflection = self.bounce(point, ray.direction.reflected(hit.normal), depth, rng);
            let refraction = if kr < 1.0 {
                refract(ray.direction, hit.normal, material.refraction_index)
                    .map_or(Color::ZERO, |dir| self.bounce(point, dir, depth, rng))
            } else {
                Color::ZERO
            };
            color += reflection * kr + refraction * (1.0 - kr);
        } else if material.is_reflective() {
            let reflection = self.bounce(point, ray.direction.reflected(normal), depth, rng);
            color += reflection * material.reflection_index;
        }

        color += self.scene.ambient_light * material.ambient_weight;
        color += self.direct_light(material, point, normal, -ray.direction, rng);

        color.hadamard(material.color)
    }

    /// Recurse along `direction` from a surface point.
    fn bounce(&self, point: Vec3, direction: Vec3, depth: u32, rng: &mut dyn RngCore) -> Color {
        let ray = Ray::offset(point, direction, SURFACE_BIAS);
        self.raycast(&ray, depth + 1, rng)
    }

    /// Diffuse + specular contribution of every unoccluded point light.
    fn direct_light(
        &self,
        material: &Material,
        point: Vec3,
        normal: Vec3,
        view: Vec3,
        rng: &mut dyn RngCore,
    ) -> Color {
        let scale = 1.0 - material.reflection_index;
        if scale <= 0.0 {
            return Color::ZERO;
        }

        let mut color = Color::ZERO;
        for light in self.scene.point_lights() {
            let to_light = light.position - point;
            let distance = to_light.length();
            if distance < EPSILON {
                continue;
            }
            let light_dir = to_light / distance;

            let shadow_dir = if self.shadow_jitter > 0.0 {
                let jittered = light_dir + random_unit_vector(rng) * self.shadow_jitter;
                jittered.try_normalize().unwrap_or(light_dir)
            } else {
                light_dir
            };
            let shadow_ray = Ray::offset(point, shadow_dir, SURFACE_BIAS);
            let blocker = self
                .closest_hit(&shadow_ray, Interval::FORWARD)
                .map_or(f32::INFINITY, |h| h.t);
            if distance >= blocker {
                continue;
            }

            let irradiance = light.irradiance_at(distance);
            let diffuse = normal.dot(light_dir).max(0.0) * material.diffuse_weight;
            let specular = if material.specular_weight > 0.0 {
                let mirrored = (-light_dir).reflected(normal);
                view.dot(mirrored).max(0.0).powf(material.specular_exponent) * material.specular_weight
            } else {
                0.0
            };
            color += irradiance * (diffuse + specular) * scale;
        }
        color
    }
}

/// Unclamped colour of `ray` against `scene`, with hard shadows.
///
/// Convenience wrapper over [`Raycaster`]; `octree` must have been built from
/// `scene` if given.
pub fn raycast(
    scene: &Scene,
    octree: Option<&Octree>,
    ray: &Ray,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    Raycaster::new(scene, octree, max_depth).raycast(ray, 0, rng)
}
