//! Environment lighting derived from an equirectangular HDR image.
//!
//! The radiance image is decoded, uploaded once, convolved into a small
//! diffuse irradiance cube map, and then released together with the one-shot
//! prefilter helper. Only the derived cube map stays alive for the run.

use anyhow::Result;
use half::f16;

use crate::{pipelines::prefilter, resources};

/// Edge length of one irradiance cube face in pixels.
const IRRADIANCE_SIZE: u32 = 64;

const ENVIRONMENT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub fn environment_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::Cube,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Environment bind_group_layout"),
    })
}

/// The derived lighting texture: a diffuse irradiance cube map, owned by the
/// scene for its whole lifetime.
pub struct EnvironmentMap {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
}

impl EnvironmentMap {
    fn from_cube(device: &wgpu::Device, texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("irradiance cube view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("irradiance sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &environment_layout(device),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("environment_bind_group"),
        });

        Self {
            texture,
            view,
            sampler,
            bind_group,
        }
    }

    /// A black 1x1 cube map standing in until (or instead of) a loaded
    /// environment. Keeps the model pipeline's bindings complete while the
    /// fallback lights do the work.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("placeholder environment"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ENVIRONMENT_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let black = [f16::ZERO; 4 * 6];
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            bytemuck::cast_slice(&black),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(8),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 6,
            },
        );
        Self::from_cube(device, texture)
    }
}

/// Load the equirectangular HDR image at `file_name` and derive the
/// irradiance cube map from it.
///
/// The raw radiance texture and the prefilter helper exist only inside this
/// function; both are released as soon as the derived map exists.
pub async fn load_environment(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    file_name: &str,
) -> Result<EnvironmentMap> {
    let bytes = resources::load_binary(file_name).await?;
    let image = image::load_from_memory_with_format(&bytes, image::ImageFormat::Hdr)?.to_rgb32f();
    log::info!(
        "decoded radiance image {} ({}x{})",
        file_name,
        image.width(),
        image.height()
    );

    let equirect = upload_equirect(device, queue, &image);
    let equirect_view = equirect.create_view(&wgpu::TextureViewDescriptor::default());

    let helper = IrradiancePrefilter::new(device);
    let irradiance = helper.run(device, queue, &equirect_view);

    // Neither the raw radiance texture nor the helper is needed again; free
    // the renderer-side memory now instead of at process teardown.
    equirect.destroy();
    drop(helper);

    Ok(EnvironmentMap::from_cube(device, irradiance))
}

/// Upload the decoded radiance image as an Rgba16Float equirectangular
/// texture.
fn upload_equirect(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &image::Rgb32FImage,
) -> wgpu::Texture {
    let (width, height) = image.dimensions();
    let mut texels = Vec::with_capacity((width * height * 4) as usize);
    for pixel in image.pixels() {
        texels.push(f16::from_f32(pixel.0[0]));
        texels.push(f16::from_f32(pixel.0[1]));
        texels.push(f16::from_f32(pixel.0[2]));
        texels.push(f16::ONE);
    }

    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("equirect radiance"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: ENVIRONMENT_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        bytemuck::cast_slice(&texels),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(8 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    texture
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct FaceUniform {
    index: u32,
    _padding: [u32; 3],
}

/// One-shot prefiltering helper. Dropped right after [`run`](Self::run), it
/// holds the only references to the prefilter pipeline and sampler.
struct IrradiancePrefilter {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

impl IrradiancePrefilter {
    fn new(device: &wgpu::Device) -> Self {
        use wgpu::util::DeviceExt;

        let pipeline = prefilter::mk_prefilter_pipeline(device, ENVIRONMENT_FORMAT);
        let layout = prefilter::prefilter_layout(device);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Prefilter Face Buffer"),
            contents: bytemuck::cast_slice(&[FaceUniform {
                index: 0,
                _padding: [0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("equirect sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            layout,
            uniform_buffer,
            sampler,
        }
    }

    /// Convolve the equirect radiance into all six faces of a fresh
    /// irradiance cube texture. One face is drawn per submit so the face
    /// uniform is in place before each pass runs.
    fn run(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        equirect_view: &wgpu::TextureView,
    ) -> wgpu::Texture {
        let cube = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("irradiance cube"),
            size: wgpu::Extent3d {
                width: IRRADIANCE_SIZE,
                height: IRRADIANCE_SIZE,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ENVIRONMENT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(equirect_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some("prefilter_bind_group"),
        });

        for face in 0..6u32 {
            queue.write_buffer(
                &self.uniform_buffer,
                0,
                bytemuck::cast_slice(&[FaceUniform {
                    index: face,
                    _padding: [0; 3],
                }]),
            );

            let face_view = cube.create_view(&wgpu::TextureViewDescriptor {
                label: Some("irradiance face"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_array_layer: face,
                array_layer_count: Some(1),
                ..Default::default()
            });

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Prefilter Encoder"),
            });
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Prefilter Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &face_view,
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
                pass.set_bind_group(0, &bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
            queue.submit(std::iter::once(encoder.finish()));
        }

        cube
    }
}
