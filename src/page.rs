//! Procedural stand-ins for the showcase pages.
//!
//! The demo host has no real page content, so each page is a fullscreen
//! shader background that is easy to tell apart mid-transition:
//!
//! - [`Page::Home`]: warm sunset gradient with a slow light sweep.
//! - [`Page::Apartment`]: vertical panels hinting at room-by-room imagery.
//! - [`Page::FloorPlan`]: blueprint grid with pulsing hotspots.
//!
//! Rendering follows the usual fullscreen-effect recipe: one oversized
//! triangle, a small uniform block with resolution and time, and all the work
//! in the fragment shader.

use crate::gpu::{GpuContext, SurfaceFrame};

/// One of the showcase pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Page {
    #[default]
    Home,
    Apartment,
    FloorPlan,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::Apartment, Page::FloorPlan];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Apartment => "Apartment",
            Page::FloorPlan => "Floor plan",
        }
    }

    pub fn index(&self) -> u32 {
        match self {
            Page::Home => 0,
            Page::Apartment => 1,
            Page::FloorPlan => 2,
        }
    }

    pub fn next(&self) -> Page {
        Page::ALL[(self.index() as usize + 1) % Page::ALL.len()]
    }

    pub fn previous(&self) -> Page {
        Page::ALL[(self.index() as usize + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

/// Uniforms for page backgrounds.
///
/// # WGSL Declaration
///
/// ```wgsl
/// struct Uniforms {
///     resolution: vec2f,
///     time: f32,
///     page: u32,
/// }
/// ```
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PageUniforms {
    resolution: [f32; 2],
    time: f32,
    page: u32,
}

/// Fullscreen pass that draws the current page's background.
pub struct PagePass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PagePass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Page Shader"),
            source: wgpu::ShaderSource::Wgsl(PAGE_SHADER.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Page Uniforms"),
            size: std::mem::size_of::<PageUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Page Bind Group Layout"),
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
            label: Some("Page Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Page Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Page Pipeline"),
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
                    format: gpu.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
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

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    /// Clear the frame and draw `page` into it.
    pub fn render(&self, gpu: &GpuContext, frame: &mut SurfaceFrame, time: f32, page: Page) {
        let uniforms = PageUniforms {
            resolution: [gpu.width() as f32, gpu.height() as f32],
            time,
            page: page.index(),
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Page Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

const PAGE_SHADER: &str = r#"
struct Uniforms {
    resolution: vec2f,
    time: f32,
    page: u32,
}

@group(0) @binding(0) var<uniform> u: Uniforms;

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> @builtin(position) vec4f {
    let x = f32((vi << 1u) & 2u) * 2.0 - 1.0;
    let y = f32(vi & 2u) * 2.0 - 1.0;
    return vec4f(x, y, 0.0, 1.0);
}

fn home(uv: vec2f) -> vec3f {
    let sky = mix(vec3f(0.95, 0.78, 0.60), vec3f(0.55, 0.32, 0.25), uv.y);
    let sweep = 0.5 + 0.5 * sin(uv.x * 3.0 - u.time * 0.4);
    return sky + vec3f(0.05, 0.04, 0.02) * sweep;
}

fn apartment(uv: vec2f) -> vec3f {
    let panel = floor(uv.x * 4.0);
    let shade = 0.75 + 0.08 * sin(panel * 1.7 + u.time * 0.3);
    let seam = smoothstep(0.0, 0.01, abs(fract(uv.x * 4.0) - 0.5) - 0.49);
    return vec3f(0.82, 0.76, 0.68) * shade * (1.0 - 0.6 * seam);
}

fn floor_plan(uv: vec2f) -> vec3f {
    let aspect = u.resolution.x / u.resolution.y;
    let p = vec2f(uv.x * aspect, uv.y) * 12.0;
    let g = abs(fract(p) - 0.5);
    let line = 1.0 - smoothstep(0.0, 0.04, min(g.x, g.y));
    var color = mix(vec3f(0.10, 0.18, 0.30), vec3f(0.45, 0.60, 0.80), line * 0.6);

    // Hotspots
    var spots = array<vec2f, 3>(vec2f(0.25, 0.35), vec2f(0.6, 0.7), vec2f(0.75, 0.3));
    for (var i = 0; i < 3; i++) {
        let d = distance(vec2f(uv.x * aspect, uv.y), vec2f(spots[i].x * aspect, spots[i].y));
        let pulse = 0.02 + 0.006 * sin(u.time * 3.0 + f32(i));
        color = mix(vec3f(0.93, 0.55, 0.35), color, smoothstep(pulse, pulse + 0.004, d));
    }
    return color;
}

@fragment
fn fs(@builtin(position) pos: vec4f) -> @location(0) vec4f {
    let uv = pos.xy / u.resolution;
    var color: vec3f;
    switch u.page {
        case 0u: { color = home(uv); }
        case 1u: { color = apartment(uv); }
        default: { color = floor_plan(uv); }
    }
    return vec4f(pow(color, vec3f(2.2)), 1.0);
}
"#;
