use lux_core::SceneError;
use thiserror::Error;

use crate::octree::OctreeError;

/// Errors surfaced by the render driver.
///
/// Per-ray problems never end up here; they shade black instead.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid scene: {0}")]
    Scene(#[from] SceneError),

    #[error("Octree build failed: {0}")]
    Octree(#[from] OctreeError),

    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
}
