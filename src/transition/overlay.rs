//! GPU overlays drawn on top of the host's page while a transition runs.
//!
//! Both overlays composite onto the frame the host already recorded
//! (`LoadOp::Load`) with standard alpha blending, so whatever the page drew
//! shows through wherever the overlay's alpha is below one.

use log::debug;
use wgpu::util::DeviceExt;

use crate::color::Color;
use crate::error::{Result, TransitionError};
use crate::gpu::SurfaceFrame;

use super::config::{TransitionConfig, TransitionStyle};
use super::driver::{OverlayRenderer, Viewport};
use super::shader::{QUAD_VERTICES, RenderParameters, SMOKE_SHADER, SmokeUniforms};

/// Gradient of the fade overlay, top-left to bottom-right.
const FADE_STOPS: [Color; 3] = [
    Color::hex(0x927867),
    Color::hex(0x7a6455),
    Color::hex(0x6b5548),
];

/// Uniforms for the gradient fade overlay.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct FadeUniforms {
    /// Screen resolution in pixels.
    resolution: [f32; 2],
    /// Overlay opacity.
    opacity: f32,
    /// Padding for alignment.
    _pad: f32,
    /// sRGB gradient stops; alpha unused.
    stops: [[f32; 4]; 3],
}

impl FadeUniforms {
    fn new(params: &RenderParameters) -> Self {
        Self {
            resolution: params.resolution,
            opacity: params.progress,
            _pad: 0.0,
            stops: FADE_STOPS.map(Color::rgba_array),
        }
    }
}

/// Procedural smoke overlay.
pub struct SmokeOverlay {
    pipeline: wgpu::RenderPipeline,
    quad: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    queue: wgpu::Queue,
    viewport: Viewport,
}

impl SmokeOverlay {
    /// Compile the smoke program and upload the full-screen quad.
    ///
    /// Shader or pipeline validation failures come back as
    /// [`TransitionError::Shader`] instead of a device panic.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Smoke Transition Shader"),
            source: wgpu::ShaderSource::Wgsl(SMOKE_SHADER.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Smoke Transition Uniforms"),
            size: std::mem::size_of::<SmokeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let quad = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Smoke Transition Quad"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Smoke Transition Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Smoke Transition Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Smoke Transition Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Smoke Transition Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x2,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(TransitionError::Shader(err.to_string()));
        }

        Ok(Self {
            pipeline,
            quad,
            uniform_buffer,
            bind_group,
            queue: queue.clone(),
            viewport,
        })
    }
}

impl OverlayRenderer for SmokeOverlay {
    type Target = SurfaceFrame;

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn render(&mut self, target: &mut SurfaceFrame, params: &RenderParameters) -> Result<()> {
        if self.viewport.is_empty() {
            return Err(TransitionError::Render("zero-sized viewport".into()));
        }

        let uniforms = SmokeUniforms::from(params);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut pass =
            begin_overlay_pass(&mut target.encoder, &target.view, "Smoke Transition Pass");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad.slice(..));
        pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
        Ok(())
    }
}

/// Flat diagonal-gradient overlay with a single opacity.
pub struct FadeOverlay {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    queue: wgpu::Queue,
    viewport: Viewport,
}

impl FadeOverlay {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fade Transition Shader"),
            source: wgpu::ShaderSource::Wgsl(FADE_SHADER.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fade Transition Uniforms"),
            size: std::mem::size_of::<FadeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Fade Transition Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Fade Transition Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fade Transition Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Fade Transition Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(TransitionError::Shader(err.to_string()));
        }

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
            queue: queue.clone(),
            viewport,
        })
    }
}

impl OverlayRenderer for FadeOverlay {
    type Target = SurfaceFrame;

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn render(&mut self, target: &mut SurfaceFrame, params: &RenderParameters) -> Result<()> {
        if self.viewport.is_empty() {
            return Err(TransitionError::Render("zero-sized viewport".into()));
        }

        let uniforms = FadeUniforms::new(params);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut pass =
            begin_overlay_pass(&mut target.encoder, &target.view, "Fade Transition Pass");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }
}

/// The overlay selected by [`TransitionConfig::style`].
pub enum Overlay {
    Smoke(SmokeOverlay),
    Fade(FadeOverlay),
}

impl Overlay {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        config: &TransitionConfig,
        viewport: Viewport,
    ) -> Result<Self> {
        debug!("building {:?} overlay at {}x{}", config.style, viewport.width, viewport.height);
        match config.style {
            TransitionStyle::Smoke => {
                SmokeOverlay::new(device, queue, format, viewport).map(Overlay::Smoke)
            }
            TransitionStyle::Fade => {
                FadeOverlay::new(device, queue, format, viewport).map(Overlay::Fade)
            }
        }
    }
}

impl OverlayRenderer for Overlay {
    type Target = SurfaceFrame;

    fn resize(&mut self, viewport: Viewport) {
        match self {
            Overlay::Smoke(overlay) => overlay.resize(viewport),
            Overlay::Fade(overlay) => overlay.resize(viewport),
        }
    }

    fn render(&mut self, target: &mut SurfaceFrame, params: &RenderParameters) -> Result<()> {
        match self {
            Overlay::Smoke(overlay) => overlay.render(target, params),
            Overlay::Fade(overlay) => overlay.render(target, params),
        }
    }
}

fn begin_overlay_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    label: &'static str,
) -> wgpu::RenderPass<'a> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

/// Gradient overlay at 135° through the three [`FADE_STOPS`].
const FADE_SHADER: &str = r#"
struct Uniforms {
    resolution: vec2f,
    opacity: f32,
    _pad: f32,
    stops: array<vec4f, 3>,
}

@group(0) @binding(0) var<uniform> u: Uniforms;

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> @builtin(position) vec4f {
    // Oversized triangle covering the viewport
    let x = f32((vi << 1u) & 2u) * 2.0 - 1.0;
    let y = f32(vi & 2u) * 2.0 - 1.0;
    return vec4f(x, y, 0.0, 1.0);
}

fn srgb_to_linear(c: vec3f) -> vec3f {
    return pow(c, vec3f(2.2));
}

@fragment
fn fs(@builtin(position) pos: vec4f) -> @location(0) vec4f {
    let uv = pos.xy / u.resolution;
    // Top-left to bottom-right
    let t = clamp((uv.x + uv.y) * 0.5, 0.0, 1.0);

    let c0 = u.stops[0].rgb;
    let c1 = u.stops[1].rgb;
    let c2 = u.stops[2].rgb;

    var color: vec3f;
    if (t < 0.5) {
        color = mix(c0, c1, t * 2.0);
    } else {
        color = mix(c1, c2, (t - 0.5) * 2.0);
    }

    return vec4f(srgb_to_linear(color), u.opacity);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::Sample;

    #[test]
    fn fade_uniforms_match_wgsl_layout() {
        // vec2f + f32 + f32, then three 16-byte stops
        assert_eq!(std::mem::size_of::<FadeUniforms>(), 64);
    }

    #[test]
    fn fade_uniforms_carry_gradient_and_opacity() {
        let sample = Sample {
            progress: 0.25,
            phase_flag: 0,
            time: 0.0,
        };
        let params = RenderParameters::from_sample(sample, [640.0, 480.0], Color::TERRACOTTA);
        let uniforms = FadeUniforms::new(&params);

        assert_eq!(uniforms.opacity, 0.25);
        assert_eq!(uniforms.resolution, [640.0, 480.0]);
        let first = uniforms.stops[0];
        assert!((first[0] - 146.0 / 255.0).abs() < 1e-6);
        assert!((first[1] - 120.0 / 255.0).abs() < 1e-6);
        assert!((first[2] - 103.0 / 255.0).abs() < 1e-6);
        let last = uniforms.stops[2];
        assert!((last[0] - 107.0 / 255.0).abs() < 1e-6);
        assert!((last[2] - 72.0 / 255.0).abs() < 1e-6);
    }
}
