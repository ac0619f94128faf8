//! Two-pass frame composition.
//!
//! The scene is rendered into an offscreen target, then a colour-split pass
//! samples that target onto the surface. The split direction rotates by a
//! fixed step every frame.

use wgpu::util::DeviceExt;

use crate::{data_structures::model::Vertex, pipelines::post};

/// Per-frame increment of the split direction, in radians.
pub const ANGLE_STEP: f32 = 0.005;

/// Offset distance in UV space between the red and blue samples.
pub const SHIFT_AMOUNT: f32 = 0.003;

/// State of the colour-split pass. The angle grows without bound, the
/// shader's trigonometry wraps it implicitly.
#[derive(Clone, Copy, Debug)]
pub struct RgbShift {
    pub amount: f32,
    pub angle: f32,
}

impl RgbShift {
    pub fn new() -> Self {
        Self {
            amount: SHIFT_AMOUNT,
            angle: 0.0,
        }
    }

    pub fn advance(&mut self) {
        self.angle += ANGLE_STEP;
    }

    pub fn to_uniform(self) -> RgbShiftUniform {
        RgbShiftUniform {
            amount: self.amount,
            angle: self.angle,
            _padding: [0.0; 2],
        }
    }
}

impl Default for RgbShift {
    fn default() -> Self {
        Self::new()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RgbShiftUniform {
    amount: f32,
    angle: f32,
    _padding: [f32; 2],
}

/// Offscreen colour + depth pair the scene pass renders into.
pub struct RenderTarget {
    #[allow(unused)]
    pub color_texture: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    #[allow(unused)]
    pub depth_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene color target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene depth target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            color_texture,
            color_view,
            depth_texture,
            depth_view,
            width: size.width,
            height: size.height,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl Vertex for QuadVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

// Two triangles covering the full surface.
const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        uv: [1.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        uv: [1.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        uv: [1.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
        uv: [0.0, 0.0],
    },
];

/// The ordered pass chain executed each frame in place of a direct render.
pub struct Composer {
    pub target: RenderTarget,
    pub shift: RgbShift,
    pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
}

impl Composer {
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Self {
        let target = RenderTarget::new(device, config.width, config.height);
        let shift = RgbShift::new();

        let pipeline = post::mk_post_pipeline(device, config.format);
        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fullscreen Quad Buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shift Uniform Buffer"),
            contents: bytemuck::cast_slice(&[shift.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("frame sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        let bind_group = mk_bind_group(device, &uniform_buffer, &target.color_view, &sampler);

        Self {
            target,
            shift,
            pipeline,
            quad_buffer,
            uniform_buffer,
            sampler,
            bind_group,
        }
    }

    /// Recreate the offscreen target to match a new surface size.
    ///
    /// The bind group is rebuilt as well since it references the old colour
    /// view.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.target = RenderTarget::new(device, width, height);
        self.bind_group = mk_bind_group(
            device,
            &self.uniform_buffer,
            &self.target.color_view,
            &self.sampler,
        );
    }

    /// Advance the split angle by its fixed step and push the uniform.
    pub fn prepare(&mut self, queue: &wgpu::Queue) {
        self.shift.advance();
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[self.shift.to_uniform()]),
        );
    }

    /// Final pass: sample the offscreen scene colour onto the surface with
    /// the split applied.
    pub fn compose(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Colour Split Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    uniform_buffer: &wgpu::Buffer,
    color_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &post::post_layout(device),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(color_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some("composer_bind_group"),
    })
}
