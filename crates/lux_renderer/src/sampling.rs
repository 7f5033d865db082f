//! Random sampling helpers.
//!
//! Every pixel gets its own RNG stream derived from the render seed and its
//! coordinates, so pixels can be traced in any order or on any thread and
//! still produce the same image.

use lux_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling inside the unit ball, then project
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Seed for pixel (x, y) of a render seeded with `seed`.
///
/// SplitMix64 finalizer over the packed coordinates.
pub fn pixel_seed(seed: u64, x: u32, y: u32) -> u64 {
    let mut z = seed ^ ((u64::from(y) << 32) | u64::from(x));
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Independent RNG stream for pixel (x, y).
pub fn pixel_rng(seed: u64, x: u32, y: u32) -> StdRng {
    StdRng::seed_from_u64(pixel_seed(seed, x, y))
}
