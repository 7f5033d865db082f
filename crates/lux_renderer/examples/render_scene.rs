//! Renders the demo room and saves it as a PNG.
//!
//! Usage: `cargo run --release --example render_scene -- [output.png] [config.json]`
//!
//! The optional JSON file holds a partial `RenderConfig`; missing fields keep
//! their defaults. Set `RUST_LOG=info` to see octree and render timings.

use std::fs;

use anyhow::{Context, Result};
use lux_core::{Color, Material, Plane, PointLight, Scene, Sphere, Triangle};
use lux_math::Vec3;
use lux_renderer::{render_parallel, Camera, PreparedScene, RenderConfig};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "render.png".to_string());
    let config = match args.next() {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?
        }
        None => RenderConfig {
            samples_per_pixel: 4,
            ..Default::default()
        },
    };

    let prepared = PreparedScene::new(build_scene()?, &config).context("preparing scene")?;

    let camera = Camera::new()
        .with_resolution(800, 600)
        .with_position(Vec3::new(0.0, 4.0, 12.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
        .with_fov(50.0);

    let image = render_parallel(&prepared, &camera, &config);
    image.save_png(&output).with_context(|| format!("writing {output}"))?;
    println!("Saved {}x{} render to {}", image.width, image.height, output);

    Ok(())
}

fn build_scene() -> Result<Scene> {
    let mut scene = Scene::with_background(Color::ZERO);
    scene.ambient_light = Color::splat(0.05);

    let grey = scene.add_material(Material::new(Color::splat(0.4)).with_ambient(1.0));
    let red_mirror = scene.add_material(
        Material::mirror(Color::new(1.0, 0.0, 0.0), 0.6)
            .with_ambient(0.2)
            .with_specular(1.0, 64.0),
    );
    let mirror = scene.add_material(Material::mirror(Color::ONE, 0.9).with_specular(1.0, 64.0));
    let glass = scene.add_material(Material::dielectric(Color::ONE, 1.4));
    let yellow = scene.add_material(
        Material::new(Color::new(1.0, 0.6549, 0.1019))
            .with_ambient(0.2)
            .with_specular(1.0, 64.0),
    );

    // Floor and four walls
    scene.add_plane(Plane::new(Vec3::Y, 0.0, grey));
    scene.add_plane(Plane::new(Vec3::Z, 50.0, grey));
    scene.add_plane(Plane::new(Vec3::Z, -50.0, grey));
    scene.add_plane(Plane::new(Vec3::X, -50.0, grey));
    scene.add_plane(Plane::new(Vec3::X, 50.0, grey));

    scene.add_sphere(Sphere::new(Vec3::new(-3.0, 1.0, 0.0), 1.0, red_mirror));
    scene.add_sphere(Sphere::new(Vec3::new(0.0, 1.5, 0.0), 1.0, mirror));
    scene.add_sphere(Sphere::new(Vec3::new(3.0, 1.0, 3.0), 1.0, glass));

    scene.add_triangle(Triangle::new(
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(3.0, 1.0, 0.0),
        red_mirror,
    ));

    // Square pyramid
    let positions = [
        Vec3::new(-1.5, 0.0, 3.0),
        Vec3::new(-0.5, 0.0, 3.0),
        Vec3::new(-0.5, 0.0, 4.0),
        Vec3::new(-1.5, 0.0, 4.0),
        Vec3::new(-1.0, 1.2, 3.5),
    ];
    let indices: [u32; 12] = [0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4];
    scene
        .add_mesh(&positions, &indices, yellow)
        .context("adding pyramid mesh")?;

    scene.add_point_light(PointLight::new(Vec3::new(0.0, 20.0, 10.0), Color::ONE, 10000.0));

    Ok(scene)
}
