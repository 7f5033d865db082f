//! A scene frozen for rendering together with its acceleration structure.

use lux_core::Scene;

use crate::error::RenderError;
use crate::octree::Octree;
use crate::raycast::Raycaster;
use crate::renderer::RenderConfig;

/// Validated, frozen scene plus the octree built from it.
///
/// Owning both keeps the octree from outliving or drifting from the
/// primitives it indexes: the scene can no longer be mutated.
#[derive(Debug, Clone)]
pub struct PreparedScene {
    scene: Scene,
    octree: Option<Octree>,
}

impl PreparedScene {
    /// Freeze and validate `scene`, building an octree if `config.use_octree`.
    pub fn new(mut scene: Scene, config: &RenderConfig) -> Result<Self, RenderError> {
        scene.freeze();
        if let Err(e) = scene.validate() {
            log::warn!("Rejecting scene: {}", e);
            return Err(e.into());
        }

        let octree = if config.use_octree {
            Some(Octree::build(&scene, &config.octree)?)
        } else {
            None
        };

        Ok(Self { scene, octree })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn octree(&self) -> Option<&Octree> {
        self.octree.as_ref()
    }

    /// Raycaster over this scene with the depth, jitter and hit policy of
    /// `config`. The octree is used only if `config.use_octree` is set.
    pub fn raycaster(&self, config: &RenderConfig) -> Raycaster<'_> {
        let octree = self.octree.as_ref().filter(|_| config.use_octree);
        Raycaster::new(&self.scene, octree, config.max_depth)
            .with_shadow_jitter(config.shadow_jitter)
            .with_hit_policy(config.hit_policy)
    }

    /// Give the scene back for editing; the octree is dropped.
    pub fn into_scene(self) -> Scene {
        self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_core::{Color, Material, SceneError, Sphere};
    use lux_math::Vec3;

    fn sphere_scene() -> Scene {
        let mut scene = Scene::with_background(Color::ZERO);
        let m = scene.add_material(Material::new(Color::ONE));
        scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0, m));
        scene
    }

    #[test]
    fn test_builds_octree_on_request() {
        let prepared = PreparedScene::new(sphere_scene(), &RenderConfig::default()).unwrap();
        assert!(prepared.octree().is_some_and(|o| o.matches(prepared.scene())));

        let config = RenderConfig {
            use_octree: false,
            ..Default::default()
        };
        let prepared = PreparedScene::new(sphere_scene(), &config).unwrap();
        assert!(prepared.octree().is_none());
    }

    #[test]
    fn test_rejects_invalid_scene() {
        let mut scene = sphere_scene();
        scene.add_sphere(Sphere::new(Vec3::ONE, 1.0, 7));

        let err = PreparedScene::new(scene, &RenderConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Scene(SceneError::MaterialOutOfRange { material: 7, .. })
        ));
    }

    #[test]
    fn test_rejects_scene_without_background() {
        let err = PreparedScene::new(Scene::new(), &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::Scene(SceneError::MissingBackground)));
    }

    #[test]
    fn test_into_scene_round_trip() {
        let prepared = PreparedScene::new(sphere_scene(), &RenderConfig::default()).unwrap();
        let mut scene = prepared.into_scene();
        scene.add_sphere(Sphere::new(Vec3::X, 0.5, 1));
        assert_eq!(scene.spheres().len(), 2);
    }
}
