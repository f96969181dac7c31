//! The smoke shader and its CPU reference.
//!
//! [`SMOKE_SHADER`] is what the GPU runs. [`shade`] evaluates the same fragment
//! math with [`crate::noise`] so the mask and colour can be checked in tests.

use glam::{Vec2, Vec3, Vec4};

use crate::color::Color;
use crate::noise::{fbm, smoothstep};

use super::phase::Sample;

/// Per-frame inputs to an overlay draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParameters {
    /// Coverage in `[0, 1]`.
    pub progress: f32,
    /// 0 = covering, 1 = revealing.
    pub phase_flag: u32,
    /// Flow clock in seconds.
    pub time: f32,
    /// Drawing surface size in pixels.
    pub resolution: [f32; 2],
    pub color: Color,
}

impl RenderParameters {
    pub fn from_sample(sample: Sample, resolution: [f32; 2], color: Color) -> Self {
        Self {
            progress: sample.progress.clamp(0.0, 1.0),
            phase_flag: sample.phase_flag,
            time: sample.time,
            resolution,
            color,
        }
    }
}

/// Uniform block shared by [`SMOKE_SHADER`].
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SmokeUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub progress: f32,
    pub color: [f32; 3],
    pub phase: u32,
}

impl From<&RenderParameters> for SmokeUniforms {
    fn from(params: &RenderParameters) -> Self {
        Self {
            resolution: params.resolution,
            time: params.time,
            progress: params.progress,
            color: params.color.rgb_array(),
            phase: params.phase_flag,
        }
    }
}

/// Full-screen quad as a 4-vertex triangle strip.
pub(crate) const QUAD_VERTICES: [[f32; 2]; 4] =
    [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

const LIGHT_OFFSET: Vec3 = Vec3::new(0.18, 0.14, 0.10);
const DARK_OFFSET: Vec3 = Vec3::new(0.15, 0.12, 0.08);
const EDGE_TINT: Vec3 = Vec3::new(0.05, 0.04, 0.03);

/// Evaluate the smoke fragment at `frag_uv` (`[0, 1]²`, origin bottom-left).
///
/// Returns straight (non-premultiplied) RGBA in sRGB display space; alpha is
/// the coverage mask.
pub fn shade(frag_uv: Vec2, params: &RenderParameters) -> Vec4 {
    let [width, height] = params.resolution;
    let mut uv = frag_uv * 2.0 - Vec2::ONE;
    if height > 0.0 {
        uv.x *= width / height;
    }

    let t = params.time * 0.2;
    let flow = Vec2::new(
        fbm(uv * 1.5 + Vec2::splat(t)),
        fbm(uv * 1.5 - Vec2::splat(t) + Vec2::splat(10.0)),
    );
    let smoke = fbm(uv * 1.2 + flow * 2.0);

    let mask = coverage(smoke, params.progress, params.phase_flag);

    let base = Vec3::from_array(params.color.rgb_array());
    let light = base + LIGHT_OFFSET;
    let dark = base - DARK_OFFSET;

    let color_noise = fbm(uv * 3.0 + Vec2::splat(t * 0.8));
    let color_noise2 = fbm(uv * 1.5 - Vec2::splat(t * 0.6) + Vec2::splat(5.0));

    let mut color = dark.lerp(light, color_noise);
    color = color.lerp(base * 1.1, color_noise2 * 0.4);
    color = color.lerp(dark * 0.9, smoke * 0.25);

    let edge = (smoke - 0.5).abs() * 2.0;
    color += EDGE_TINT * edge * mask;

    color.extend(mask)
}

/// Coverage mask for a smoke density at the given progress.
///
/// The 1.4 overshoot lets `progress = 1` saturate every pixel while covering.
/// Revealing uses mirrored edges so the smoke thins out before it vanishes.
pub fn coverage(smoke: f32, progress: f32, phase_flag: u32) -> f32 {
    let threshold = progress * 1.4;
    let (below, above) = if phase_flag == 0 { (0.3, 0.1) } else { (0.1, 0.3) };
    smoothstep(smoke - below, smoke + above, threshold).clamp(0.0, 1.0)
}

/// Vertex + fragment program for the smoke overlay.
pub const SMOKE_SHADER: &str = r#"
struct Uniforms {
    resolution: vec2f,
    time: f32,
    progress: f32,
    color: vec3f,
    phase: u32, // 0 = covering, 1 = revealing
}

@group(0) @binding(0) var<uniform> u: Uniforms;

struct VsOut {
    @builtin(position) position: vec4f,
    @location(0) uv: vec2f,
}

@vertex
fn vs(@location(0) pos: vec2f) -> VsOut {
    var out: VsOut;
    out.uv = pos * 0.5 + 0.5;
    out.position = vec4f(pos, 0.0, 1.0);
    return out;
}

fn random(p: vec2f) -> f32 {
    return fract(sin(dot(p, vec2f(127.1, 311.7))) * 43758.5453123);
}

fn noise(p: vec2f) -> f32 {
    let i = floor(p);
    let f = fract(p);
    let a = random(i);
    let b = random(i + vec2f(1.0, 0.0));
    let c = random(i + vec2f(0.0, 1.0));
    let d = random(i + vec2f(1.0, 1.0));
    let w = f * f * (3.0 - 2.0 * f);
    return mix(a, b, w.x) + (c - a) * w.y * (1.0 - w.x) + (d - b) * w.x * w.y;
}

fn fbm(p_in: vec2f) -> f32 {
    var p = p_in;
    var v = 0.0;
    var a = 0.5;
    for (var i = 0; i < 6; i++) {
        v += a * noise(p);
        p *= 2.0;
        a *= 0.5;
    }
    return v;
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4f {
    var uv = in.uv * 2.0 - 1.0;
    uv.x *= u.resolution.x / u.resolution.y;

    let t = u.time * 0.2;

    // Advect the smoke with two time-shifted fields
    let flow = vec2f(
        fbm(uv * 1.5 + t),
        fbm(uv * 1.5 - t + 10.0)
    );
    let smoke = fbm(uv * 1.2 + flow * 2.0);

    // Overshoot so progress = 1 covers every pixel
    let threshold = u.progress * 1.4;
    var mask: f32;
    if (u.phase == 0u) {
        mask = smoothstep(smoke - 0.3, smoke + 0.1, threshold);
    } else {
        mask = smoothstep(smoke - 0.1, smoke + 0.3, threshold);
    }
    mask = clamp(mask, 0.0, 1.0);

    let light = u.color + vec3f(0.18, 0.14, 0.10);
    let dark = u.color - vec3f(0.15, 0.12, 0.08);

    let color_noise = fbm(uv * 3.0 + t * 0.8);
    let color_noise2 = fbm(uv * 1.5 - t * 0.6 + 5.0);

    var color = mix(dark, light, color_noise);
    color = mix(color, u.color * 1.1, color_noise2 * 0.4);
    color = mix(color, dark * 0.9, smoke * 0.25);

    let edge = abs(smoke - 0.5) * 2.0;
    color += vec3f(0.05, 0.04, 0.03) * edge * mask;

    // Colors are authored in sRGB; the surface expects linear values
    return vec4f(pow(max(color, vec3f(0.0)), vec3f(2.2)), mask);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::XorShift;

    fn params(progress: f32, phase_flag: u32) -> RenderParameters {
        RenderParameters {
            progress,
            phase_flag,
            time: 1.3,
            resolution: [1280.0, 720.0],
            color: Color::TERRACOTTA,
        }
    }

    #[test]
    fn uniforms_are_std140_sized() {
        assert_eq!(std::mem::size_of::<SmokeUniforms>(), 32);
    }

    #[test]
    fn full_cover_is_opaque_everywhere() {
        let mut rng = XorShift::new(5);
        for _ in 0..500 {
            let uv = Vec2::new(rng.range(0.0, 1.0), rng.range(0.0, 1.0));
            assert_eq!(shade(uv, &params(1.0, 0)).w, 1.0);
        }
    }

    #[test]
    fn mask_grows_with_progress_while_covering() {
        let mut rng = XorShift::new(8);
        for _ in 0..200 {
            let smoke = rng.range(0.0, 1.0);
            let mut last = 0.0;
            for step in 0..=20 {
                let m = coverage(smoke, step as f32 / 20.0, 0);
                assert!(m >= last);
                last = m;
            }
        }
    }

    #[test]
    fn reveal_mask_never_exceeds_cover_mask() {
        let mut rng = XorShift::new(9);
        for _ in 0..500 {
            let smoke = rng.range(0.0, 1.0);
            let progress = rng.range(0.0, 1.0);
            assert!(coverage(smoke, progress, 1) <= coverage(smoke, progress, 0) + 1e-6);
        }
    }

    #[test]
    fn shade_mask_matches_coverage_bounds() {
        let mut rng = XorShift::new(10);
        for _ in 0..300 {
            let uv = Vec2::new(rng.range(0.0, 1.0), rng.range(0.0, 1.0));
            let progress = rng.range(0.0, 1.0);
            let out = shade(uv, &params(progress, 1));
            assert!((0.0..=1.0).contains(&out.w));
            assert!(out.x.is_finite() && out.y.is_finite() && out.z.is_finite());
        }
    }

    #[test]
    fn parameters_clamp_progress() {
        let sample = Sample {
            progress: 3.0,
            phase_flag: 1,
            time: 0.5,
        };
        let p = RenderParameters::from_sample(sample, [10.0, 10.0], Color::hex(0x000000));
        assert_eq!(p.progress, 1.0);
        assert_eq!(p.phase_flag, 1);
    }
}
