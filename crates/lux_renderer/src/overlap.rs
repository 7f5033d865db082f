//! Exact primitive/box overlap predicates used to fill octree nodes.
//!
//! Both predicates are conservative in the sense that touching counts as
//! overlapping: a primitive is only rejected when a strict gap exists.

use lux_core::{Sphere, Triangle};
use lux_math::{Aabb, Vec3};

/// Arvo's sphere/box test.
///
/// Accumulates `r² - Σ d²`, where `d` is the per-axis distance from the
/// sphere centre to the box (0 when the centre lies within that slab).
/// The sphere overlaps the box iff the result stays positive.
pub fn sphere_overlaps_box(sphere: &Sphere, aabb: &Aabb) -> bool {
    let mut remaining = sphere.radius * sphere.radius;
    for axis in 0..3 {
        let c = sphere.center[axis];
        let d = if c < aabb.min[axis] {
            c - aabb.min[axis]
        } else if c > aabb.max[axis] {
            c - aabb.max[axis]
        } else {
            0.0
        };
        remaining -= d * d;
    }
    remaining > 0.0
}

/// Separating-axis test for triangle/box overlap (Akenine-Möller).
///
/// Tries 13 candidate axes: the 3 box face normals, the triangle normal and
/// the 9 cross products of triangle edges with box axes.
pub fn triangle_overlaps_box(triangle: &Triangle, aabb: &Aabb) -> bool {
    let center = aabb.centroid();
    let half = aabb.half_extents();

    // Work in box-centred coordinates
    let v = triangle.vertices().map(|p| p - center);

    // Box face normals: the triangle's extent on x/y/z against the box's
    for axis in 0..3 {
        let lo = v[0][axis].min(v[1][axis]).min(v[2][axis]);
        let hi = v[0][axis].max(v[1][axis]).max(v[2][axis]);
        if lo > half[axis] || hi < -half[axis] {
            return false;
        }
    }

    // Triangle normal: the box corners must straddle the triangle's plane
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];
    let normal = edges[0].cross(edges[1]);
    if !plane_overlaps_box(normal, normal.dot(v[0]), half) {
        return false;
    }

    // Edge x box-axis cross products
    for edge in edges {
        for box_axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            let axis = edge.cross(box_axis);
            if separates(axis, &v, half) {
                return false;
            }
        }
    }

    true
}

/// True if the plane `normal · p = offset` passes through the box `[-half, half]`.
fn plane_overlaps_box(normal: Vec3, offset: f32, half: Vec3) -> bool {
    // Projection radius of the box onto the normal
    let r = half.dot(normal.abs());
    offset.abs() <= r
}

/// True if `axis` separates the centred triangle `v` from the box `[-half, half]`.
fn separates(axis: Vec3, v: &[Vec3; 3], half: Vec3) -> bool {
    let p0 = v[0].dot(axis);
    let p1 = v[1].dot(axis);
    let p2 = v[2].dot(axis);
    let lo = p0.min(p1).min(p2);
    let hi = p0.max(p1).max(p2);
    let r = half.dot(axis.abs());
    lo > r || hi < -r
}
