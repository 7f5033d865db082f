//! Scene store.
//!
//! Flat, append-only collections of materials, primitives and lights.
//! Authoring code fills a `Scene`, calls [`Scene::freeze`], and from then on
//! the renderer only reads it.

use lux_math::{Aabb, Vec3};
use thiserror::Error;

use crate::{Color, Material, Plane, PointLight, Sphere, Triangle};

/// Material index reserved for the background. It must be registered first.
pub const BACKGROUND_MATERIAL: usize = 0;

/// Errors reported by [`Scene::validate`] and [`Scene::add_mesh`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Scene has no background material (material 0 must be added first)")]
    MissingBackground,

    #[error("{primitive} {index} references material {material}, but only {count} materials exist")]
    MaterialOutOfRange {
        primitive: &'static str,
        index: usize,
        material: usize,
        count: usize,
    },

    #[error("{primitive} {index} has non-finite geometry")]
    NonFinite { primitive: &'static str, index: usize },

    #[error("Mesh index {index} refers to vertex {vertex}, but only {count} positions exist")]
    MeshIndexOutOfRange {
        index: usize,
        vertex: u32,
        count: usize,
    },
}

/// A complete scene: materials, unbounded planes, bounded primitives and lights.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    materials: Vec<Material>,
    planes: Vec<Plane>,
    spheres: Vec<Sphere>,
    triangles: Vec<Triangle>,
    point_lights: Vec<PointLight>,

    /// Unshadowed light added to every hit, scaled by `Material::ambient_weight`
    pub ambient_light: Color,
}

impl Scene {
    /// Create an empty scene. The first material added becomes the background.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scene whose background material has the given colour.
    pub fn with_background(color: Color) -> Self {
        let mut scene = Self::new();
        scene.add_material(Material::new(color).with_diffuse(0.0));
        scene
    }

    /// Add a material to the scene and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        let id = self.materials.len();
        self.materials.push(material);
        id
    }

    pub fn add_plane(&mut self, plane: Plane) {
        self.planes.push(plane);
    }

    pub fn add_sphere(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn add_point_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    /// Append an indexed triangle mesh. Every index triple becomes one triangle.
    ///
    /// Trailing indices that do not form a full triple are ignored. If any
    /// index is out of range of `positions` nothing is added.
    pub fn add_mesh(
        &mut self,
        positions: &[Vec3],
        indices: &[u32],
        material: usize,
    ) -> Result<(), SceneError> {
        let used = indices.len() - indices.len() % 3;
        if let Some((index, &vertex)) = indices[..used]
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= positions.len())
        {
            return Err(SceneError::MeshIndexOutOfRange {
                index,
                vertex,
                count: positions.len(),
            });
        }

        self.triangles.reserve(used / 3);
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| positions[i as usize]);
            self.triangles.push(Triangle::new(a, b, c, material));
        }
        Ok(())
    }

    /// Trim every collection's capacity to its exact length.
    pub fn freeze(&mut self) {
        self.materials.shrink_to_fit();
        self.planes.shrink_to_fit();
        self.spheres.shrink_to_fit();
        self.triangles.shrink_to_fit();
        self.point_lights.shrink_to_fit();

        log::debug!(
            "Froze scene: {} materials, {} planes, {} spheres, {} triangles, {} lights",
            self.materials.len(),
            self.planes.len(),
            self.spheres.len(),
            self.triangles.len(),
            self.point_lights.len()
        );
    }

    /// Check the references and geometry the raycaster relies on.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.materials.is_empty() {
            return Err(SceneError::MissingBackground);
        }

        let count = self.materials.len();
        let check = |primitive: &'static str, index: usize, material: usize, finite: bool| {
            if material >= count {
                return Err(SceneError::MaterialOutOfRange {
                    primitive,
                    index,
                    material,
                    count,
                });
            }
            if !finite {
                return Err(SceneError::NonFinite { primitive, index });
            }
            Ok(())
        };

        for (i, p) in self.planes.iter().enumerate() {
            check("plane", i, p.material, p.is_finite())?;
        }
        for (i, s) in self.spheres.iter().enumerate() {
            check("sphere", i, s.material, s.is_finite())?;
        }
        for (i, t) in self.triangles.iter().enumerate() {
            check("triangle", i, t.material, t.is_finite())?;
        }
        for (i, l) in self.point_lights.iter().enumerate() {
            if !l.is_finite() {
                return Err(SceneError::NonFinite { primitive: "point light", index: i });
            }
        }
        Ok(())
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    /// Get a material by index.
    pub fn material(&self, id: usize) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Colour returned for rays that hit nothing (black if no material exists).
    pub fn background(&self) -> Color {
        self.material(BACKGROUND_MATERIAL)
            .map_or(Color::ZERO, |m| m.color)
    }

    /// Bounds of all spheres and triangles; `None` when there are none.
    ///
    /// Spheres contribute their six axis-extreme points, triangles their vertices.
    pub fn bounded_extent(&self) -> Option<Aabb> {
        let sphere_boxes = self.spheres.iter().map(Sphere::bounding_box);
        let triangle_boxes = self.triangles.iter().map(Triangle::bounding_box);
        sphere_boxes
            .chain(triangle_boxes)
            .reduce(|a, b| Aabb::surrounding(&a, &b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_scene() -> Scene {
        let mut scene = Scene::with_background(Color::ZERO);
        let grey = scene.add_material(Material::new(Color::splat(0.4)));
        scene.add_plane(Plane::new(Vec3::Y, 0.0, grey));
        scene.add_sphere(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, grey));
        scene.add_triangle(Triangle::new(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(3.0, 1.0, 0.0),
            grey,
        ));
        scene.add_point_light(PointLight::new(Vec3::new(0.0, 20.0, 10.0), Color::ONE, 10000.0));
        scene
    }

    #[test]
    fn test_material_indices_are_sequential() {
        let mut scene = Scene::new();
        assert_eq!(scene.add_material(Material::new(Color::ZERO)), BACKGROUND_MATERIAL);
        assert_eq!(scene.add_material(Material::new(Color::ONE)), 1);
        assert_eq!(scene.materials().len(), 2);
    }

    #[test]
    fn test_validate_ok() {
        let mut scene = small_scene();
        scene.freeze();
        assert_eq!(scene.validate(), Ok(()));
    }

    #[test]
    fn test_validate_missing_background() {
        let mut scene = Scene::new();
        scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, 0));
        assert_eq!(scene.validate(), Err(SceneError::MissingBackground));
    }

    #[test]
    fn test_validate_material_out_of_range() {
        let mut scene = small_scene();
        scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, 7));
        assert_eq!(
            scene.validate(),
            Err(SceneError::MaterialOutOfRange {
                primitive: "sphere",
                index: 1,
                material: 7,
                count: 2,
            })
        );
    }

    #[test]
    fn test_validate_non_finite() {
        let mut scene = small_scene();
        scene.add_triangle(Triangle::new(Vec3::ZERO, Vec3::X, Vec3::splat(f32::INFINITY), 1));
        assert!(matches!(
            scene.validate(),
            Err(SceneError::NonFinite { primitive: "triangle", index: 1 })
        ));
    }

    #[test]
    fn test_add_mesh() {
        let mut scene = Scene::with_background(Color::ZERO);
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        scene.add_mesh(&positions, &[0, 1, 2, 0, 2, 3, 1], 0).unwrap();
        assert_eq!(scene.triangles().len(), 2);
        assert_eq!(scene.triangles()[1].v2, Vec3::Z);
    }

    #[test]
    fn test_add_mesh_rejects_bad_index() {
        let mut scene = Scene::with_background(Color::ZERO);
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let err = scene
            .add_mesh(&positions, &[0, 1, 2, 2, 1, 3], 0)
            .unwrap_err();
        assert_eq!(
            err,
            SceneError::MeshIndexOutOfRange {
                index: 5,
                vertex: 3,
                count: 3
            }
        );
        // The valid first triangle is not added either.
        assert!(scene.triangles().is_empty());

        // An out-of-range index in an ignored trailing group is fine.
        scene.add_mesh(&positions, &[0, 1, 2, 9], 0).unwrap();
        assert_eq!(scene.triangles().len(), 1);
    }

    #[test]
    fn test_background() {
        assert_eq!(Scene::new().background(), Color::ZERO);
        assert_eq!(Scene::with_background(Color::ONE).background(), Color::ONE);
    }

    #[test]
    fn test_bounded_extent_ignores_planes() {
        let scene = small_scene();
        let extent = scene.bounded_extent().unwrap();
        assert_eq!(extent.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(extent.max, Vec3::new(4.0, 2.0, 1.0));

        let mut planes_only = Scene::with_background(Color::ZERO);
        planes_only.add_plane(Plane::new(Vec3::Y, 0.0, 0));
        assert!(planes_only.bounded_extent().is_none());
    }

    #[test]
    fn test_freeze_trims_capacity() {
        let mut scene = Scene::new();
        for i in 0..10 {
            scene.add_sphere(Sphere::new(Vec3::splat(i as f32), 1.0, 0));
        }
        scene.freeze();
        assert_eq!(scene.spheres.capacity(), scene.spheres.len());
    }
}
