/// wgpu implementation of the scene's render backend
use std::borrow::Cow;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use log::{info, warn};
use meshview_core::{DrawCall, Light, Mesh, RenderBackend, Shading, Viewport};
use nalgebra::Matrix4;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform slots per frame: a shadow pass and a main pass, with headroom.
const MAX_DRAWS: usize = 4;

/// Maps OpenGL clip depth [-1, 1] onto wgpu's [0, 1].
#[rustfmt::skip]
fn gl_to_wgpu() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Interleaved vertex record: position at byte 0, normal at byte 12.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl GpuVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<GpuVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };
}

/// Flatten a mesh into the interleaved buffer layout.
pub fn interleave(mesh: &Mesh) -> Vec<GpuVertex> {
    mesh.vertices
        .iter()
        .map(|v| GpuVertex {
            position: v.position.coords.into(),
            normal: v.normal.into(),
        })
        .collect()
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct DrawUniforms {
    mvp: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    light: [f32; 4],
}

struct PendingDraw {
    uniforms: DrawUniforms,
    depth_test: bool,
    vertex_count: u32,
}

/// GPU state for one window: surface, pipelines, mesh buffer and the draws
/// queued for the current frame.
pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    depth_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_stride: u64,
    bind_group: wgpu::BindGroup,

    vertex_buffer: Option<wgpu::Buffer>,

    viewport: Viewport,
    projection: Matrix4<f32>,
    light: Light,
    clear_color: [f32; 4],
    pending: Vec<PendingDraw>,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .context("create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .context("no compatible GPU adapter")?;
        info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("meshview-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .context("request device")?;

        // Colours are specified in linear terms, so prefer a non-sRGB target.
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth(&device, config.width, config.height);

        let uniform_size = std::mem::size_of::<DrawUniforms>() as u64;
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = uniform_size.div_ceil(alignment) * alignment;
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw-uniforms"),
            size: uniform_stride * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_size),
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw-bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(uniform_size),
                }),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("meshview-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shader.wgsl"))),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("meshview-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let depth_pipeline = create_pipeline(&device, &layout, &shader, format, true);
        let overlay_pipeline = create_pipeline(&device, &layout, &shader, format, false);

        Ok(Self {
            surface,
            device,
            queue,
            viewport: Viewport::new(config.width, config.height),
            config,
            depth_view,
            depth_pipeline,
            overlay_pipeline,
            uniform_buffer,
            uniform_stride,
            bind_group,
            vertex_buffer: None,
            projection: Matrix4::identity(),
            light: Light::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            pending: Vec::with_capacity(MAX_DRAWS),
        })
    }

    /// Reconfigure the surface and depth buffer for a new window size.
    /// A minimised (zero-sized) window keeps the old configuration.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth(&self.device, size.width, size.height);
    }

    /// Encode the queued draws into one render pass and present it.
    pub fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        for (slot, draw) in self.pending.iter().enumerate() {
            self.queue.write_buffer(
                &self.uniform_buffer,
                slot as u64 * self.uniform_stride,
                bytemuck::bytes_of(&draw.uniforms),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        {
            let [r, g, b, a] = self.clear_color.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let width = self.viewport.width.min(self.config.width).max(1);
            let height = self.viewport.height.min(self.config.height).max(1);
            pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);

            if let Some(vertex_buffer) = &self.vertex_buffer {
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                for (slot, draw) in self.pending.iter().enumerate() {
                    if draw.vertex_count == 0 {
                        continue;
                    }
                    let pipeline = if draw.depth_test {
                        &self.depth_pipeline
                    } else {
                        &self.overlay_pipeline
                    };
                    pass.set_pipeline(pipeline);
                    let offset = slot as u64 * self.uniform_stride;
                    pass.set_bind_group(0, &self.bind_group, &[offset as u32]);
                    pass.draw(0..draw.vertex_count, 0..1);
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        self.pending.clear();
        Ok(())
    }
}

impl RenderBackend for GpuRenderer {
    fn upload_mesh(&mut self, mesh: &Mesh) {
        let vertices = interleave(mesh);
        info!("uploading {} vertices ({} triangles)", vertices.len(), mesh.triangle_count());
        self.vertex_buffer = Some(self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("mesh-vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn set_projection(&mut self, projection: &Matrix4<f32>) {
        self.projection = gl_to_wgpu() * projection;
    }

    fn set_light(&mut self, light: &Light) {
        self.light = *light;
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        self.clear_color = clear_color;
        self.pending.clear();
    }

    fn draw(&mut self, call: &DrawCall) {
        if self.pending.len() == MAX_DRAWS {
            warn!("dropping draw call: more than {MAX_DRAWS} in one frame");
            return;
        }

        let (diffuse, specular, shininess) = match call.shading {
            Shading::Lit(material) => (material.diffuse, material.specular, material.shininess),
            // Negative shininess selects the unlit branch of the fragment shader.
            Shading::Flat([r, g, b]) => ([r, g, b, 1.0], [0.0; 4], -1.0),
        };
        let d = self.light.direction;
        let mvp = self.projection * call.model;

        self.pending.push(PendingDraw {
            uniforms: DrawUniforms {
                mvp: mvp.into(),
                model: call.model.into(),
                diffuse,
                specular,
                light: [d.x, d.y, d.z, shininess],
            },
            depth_test: call.depth_test,
            vertex_count: call.vertex_count as u32,
        });
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    depth_test: bool,
) -> wgpu::RenderPipeline {
    let depth_stencil = wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: depth_test,
        depth_compare: if depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(if depth_test { "depth-tested" } else { "overlay" }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[GpuVertex::LAYOUT],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(depth_stencil),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

fn create_depth(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_core::parse_obj;
    use nalgebra::{Point3, Vector4};

    #[test]
    fn test_vertex_layout_matches_interleaved_record() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 24);
        assert_eq!(std::mem::offset_of!(GpuVertex, normal), 12);
        assert_eq!(GpuVertex::LAYOUT.array_stride, 24);
    }

    #[test]
    fn test_uniforms_fit_wgsl_layout() {
        assert_eq!(std::mem::size_of::<DrawUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 176);
    }

    #[test]
    fn test_interleave_keeps_corner_order() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 3 2 1\n").unwrap();
        let vertices = interleave(&mesh);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].position, [0.0, 1.0, 0.0]);
        assert_eq!(vertices[2].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_depth_remap() {
        let remap = gl_to_wgpu();
        let near = remap * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = remap * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z, 0.0);
        assert_eq!(far.z, 1.0);
        let p = remap.transform_point(&Point3::new(0.3, -0.2, 0.0));
        assert_eq!(p, Point3::new(0.3, -0.2, 0.5));
    }
}
