use crate::pipelines::model::mk_render_pipeline;

/// Bind group layout of the one-shot irradiance prefilter: per-face uniform
/// plus the raw equirectangular radiance texture it integrates.
pub fn prefilter_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Prefilter bind_group_layout"),
    })
}

/// One cube face is convolved per draw, the shader generates a fullscreen
/// triangle from the vertex index so no vertex buffer is bound.
pub fn mk_prefilter_pipeline(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Prefilter Pipeline Layout"),
        bind_group_layouts: &[&prefilter_layout(device)],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Irradiance Prefilter Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("irradiance.wgsl").into()),
    };

    mk_render_pipeline(device, &layout, target_format, None, None, &[], shader)
}
