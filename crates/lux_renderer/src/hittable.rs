//! Ray-primitive intersection.
//!
//! Every test returns a tagged [`Hit`] instead of writing into a shared
//! record, so a miss can never be confused with a hit on material 0.

use lux_core::{Plane, Sphere, Triangle};
use lux_math::{Interval, Ray, Vec3, EPSILON};

/// The closest intersection found along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter of the intersection
    pub t: f32,
    /// Outward surface normal (unit length)
    pub normal: Vec3,
    /// Material index of the primitive that was hit
    pub material: usize,
}

impl Hit {
    /// Normal flipped to face against the incoming ray.
    pub fn face_normal(&self, ray: &Ray) -> Vec3 {
        if ray.direction.dot(self.normal) > 0.0 {
            -self.normal
        } else {
            self.normal
        }
    }
}

/// Trait for primitives that can be hit by rays.
pub trait Hittable {
    /// Test if a ray hits this primitive strictly inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit>;
}

impl Hittable for Plane {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        // normal · (o + t d) = distance
        let denominator = self.normal.dot(ray.direction);
        if denominator.abs() < EPSILON {
            return None;
        }

        let t = (self.distance - self.normal.dot(ray.origin)) / denominator;
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(Hit {
            t,
            normal: self.normal,
            material: self.material,
        })
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        if a < EPSILON {
            return None;
        }
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        // Grazing rays count as misses
        if sqrtd <= EPSILON {
            return None;
        }

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        Some(Hit {
            t: root,
            normal: (p - self.center).normalize_or_zero(),
            material: self.material,
        })
    }
}

impl Hittable for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        let (edge1, edge2) = self.edges();

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle, or the triangle has no area
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(Hit {
            t,
            normal: self.normal(),
            material: self.material,
        })
    }
}

/// Closest hit among `primitives`, shrinking `ray_t` as hits are found.
pub fn closest_in<'a, H, I>(primitives: I, ray: &Ray, ray_t: Interval) -> Option<Hit>
where
    H: Hittable + 'a,
    I: IntoIterator<Item = &'a H>,
{
    let mut closest: Option<Hit> = None;
    for primitive in primitives {
        let range = ray_t.with_max(closest.map_or(ray_t.max, |h| h.t));
        if let Some(hit) = primitive.hit(ray, range) {
            closest = Some(hit);
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_hit() {
        let floor = Plane::new(Vec3::Y, 0.0, 1);
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);
        let hit = floor.hit(&ray, Interval::FORWARD).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec3::Y);
        assert_eq!(hit.material, 1);
    }

    #[test]
    fn test_plane_offset_uses_hesse_form() {
        let wall = Plane::new(Vec3::Z, 50.0, 1);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!((wall.hit(&ray, Interval::FORWARD).unwrap().t - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_plane_parallel_and_behind_are_misses() {
        let floor = Plane::new(Vec3::Y, 0.0, 1);
        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(floor.hit(&parallel, Interval::FORWARD).is_none());

        let away = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(floor.hit(&away, Interval::FORWARD).is_none());
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, 2);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hit = sphere.hit(&ray, Interval::FORWARD).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert_eq!(hit.material, 2);
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, 1);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = sphere.hit(&ray, Interval::FORWARD).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        // Outward normal, pointing along the ray
        assert!(hit.normal.dot(ray.direction) > 0.0);
        assert!((hit.face_normal(&ray) + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, 1);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(sphere.hit(&ray, Interval::FORWARD).is_none());

        let behind = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(sphere.hit(&behind, Interval::FORWARD).is_none());
    }

    #[test]
    fn test_triangle_hit() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            3,
        );
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hit = tri.hit(&ray, Interval::FORWARD).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Z);
        assert_eq!(hit.material, 3);
    }

    #[test]
    fn test_triangle_miss_and_degenerate() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            1,
        );
        let away = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(tri.hit(&away, Interval::FORWARD).is_none());

        let outside = Ray::new(Vec3::new(5.0, 0.0, 0.0), -Vec3::Z);
        assert!(tri.hit(&outside, Interval::FORWARD).is_none());

        let sliver = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0), 1);
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), -Vec3::Z);
        assert!(sliver.hit(&ray, Interval::FORWARD).is_none());
    }

    #[test]
    fn test_closest_in_picks_nearest() {
        let spheres = [
            Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, 1),
            Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0, 2),
            Sphere::new(Vec3::new(0.0, 0.0, -7.0), 1.0, 3),
        ];
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hit = closest_in(&spheres, &ray, Interval::FORWARD).unwrap();
        assert_eq!(hit.material, 2);
        assert!((hit.t - 3.0).abs() < 1e-5);

        assert!(closest_in(&spheres, &ray, Interval::new(0.0, 2.0)).is_none());
    }
}
