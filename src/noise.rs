//! Value noise and fractal Brownian motion.
//!
//! These are the CPU counterparts of the functions compiled into the smoke
//! shader (see [`crate::transition::shader`]). They exist so the field can be
//! sampled outside the GPU: by [`shade`](crate::transition::shader::shade) and
//! by tests that check the field behaves.
//!
//! The hash is the classic `fract(sin(dot(p, k)) * 43758.5453)` scramble. It is
//! not meant to be statistically good, only cheap and stable on both sides.

use glam::Vec2;

/// Number of octaves summed by [`fbm`].
pub const FBM_OCTAVES: u32 = 6;

const HASH_KEY: Vec2 = Vec2::new(127.1, 311.7);
const HASH_SCALE: f32 = 43758.547;

/// Pseudo-random value in `[0, 1]` for a lattice point.
pub fn random(p: Vec2) -> f32 {
    fract(p.dot(HASH_KEY).sin() * HASH_SCALE)
}

/// Smoothed value noise over the integer lattice.
pub fn noise(p: Vec2) -> f32 {
    let i = p.floor();
    let f = p - i;

    let a = random(i);
    let b = random(i + Vec2::X);
    let c = random(i + Vec2::Y);
    let d = random(i + Vec2::ONE);

    // 3f² - 2f³ keeps the first derivative continuous across cells
    let u = f * f * (Vec2::splat(3.0) - 2.0 * f);

    mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y
}

/// Fractal Brownian motion: [`FBM_OCTAVES`] octaves of [`noise`] with
/// persistence 0.5 and lacunarity 2.
pub fn fbm(mut p: Vec2) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    for _ in 0..FBM_OCTAVES {
        value += amplitude * noise(p);
        p *= 2.0;
        amplitude *= 0.5;
    }
    value
}

/// GLSL-style `fract` (always non-negative).
pub(crate) fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// GLSL `smoothstep`.
pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::XorShift;

    #[test]
    fn random_is_deterministic_and_bounded() {
        let mut rng = XorShift::new(7);
        for _ in 0..1000 {
            let p = Vec2::new(rng.range(-500.0, 500.0), rng.range(-500.0, 500.0)).floor();
            let r = random(p);
            assert!((0.0..=1.0).contains(&r), "random({p}) = {r}");
            assert_eq!(r, random(p));
        }
    }

    #[test]
    fn noise_matches_lattice_values() {
        for (x, y) in [(0.0, 0.0), (3.0, -2.0), (-7.0, 11.0)] {
            let p = Vec2::new(x, y);
            assert!((noise(p) - random(p)).abs() < 1e-6);
        }
    }

    #[test]
    fn fbm_stays_in_unit_range() {
        let mut rng = XorShift::new(42);
        // Octave amplitudes sum to 1 - 2^-6
        let ceiling = 1.0 - 0.5f32.powi(FBM_OCTAVES as i32) + 1e-4;
        for _ in 0..2000 {
            let p = Vec2::new(rng.range(-20.0, 20.0), rng.range(-20.0, 20.0));
            let v = fbm(p);
            assert!(v >= 0.0 && v <= ceiling, "fbm({p}) = {v}");
        }
    }

    #[test]
    fn fbm_is_continuous() {
        let mut rng = XorShift::new(1234);
        for _ in 0..2000 {
            let p = Vec2::new(rng.range(-4.0, 4.0), rng.range(-4.0, 4.0));
            let dir = Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0)).normalize_or(Vec2::X);
            let step = rng.range(1e-4, 1e-3);
            let q = p + dir * step;

            // Each octave contributes at most ~3 units of slope, six octaves
            let bound = 20.0 * step + 1e-4;
            let diff = (fbm(p) - fbm(q)).abs();
            assert!(diff < bound, "fbm jumped by {diff} over {step} at {p}");
        }
    }

    #[test]
    fn noise_is_continuous_across_cell_edges() {
        for x in -5..5 {
            let edge = Vec2::new(x as f32, 0.37);
            let left = noise(edge - Vec2::new(1e-4, 0.0));
            let right = noise(edge + Vec2::new(1e-4, 0.0));
            assert!((left - right).abs() < 1e-3);
        }
    }

    #[test]
    fn smoothstep_clamps() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
