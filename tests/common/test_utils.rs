#![cfg(feature = "integration-tests")]

use prism::{
    data_structures::{
        model::{Material, Model, ModelVertex},
        texture::Texture,
    },
    resources::{
        mesh::{MeshData, upload_meshes},
        texture::material_layout,
    },
};

/// Request a headless adapter and device. GPU-dependent tests are gated
/// behind the `integration-tests` feature so the default suite stays
/// runnable on machines without one.
pub async fn gpu_device() -> (wgpu::Device, wgpu::Queue) {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .expect("No adapter available for integration tests");
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("integration test device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .expect("Failed to create a device for integration tests")
}

/// A surface configuration standing in for a real window surface.
pub fn test_surface_config(width: u32, height: u32) -> wgpu::SurfaceConfiguration {
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        width,
        height,
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}

/// The texture a frame is composited into in place of a window surface.
pub fn test_surface_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test surface"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}

/// A single white triangle, enough model to drive the full draw path.
pub fn triangle_model(device: &wgpu::Device, queue: &wgpu::Queue) -> Model {
    let vertices = vec![
        ModelVertex {
            position: [0.0, 0.0, 0.0],
            tex_coords: [0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        },
        ModelVertex {
            position: [1.0, 0.0, 0.0],
            tex_coords: [1.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        },
        ModelVertex {
            position: [0.0, 1.0, 0.0],
            tex_coords: [0.0, 1.0],
            normal: [0.0, 0.0, 1.0],
        },
    ];
    let meshes = upload_meshes(
        vec![MeshData {
            name: "triangle".to_string(),
            vertices,
            indices: vec![0, 1, 2],
            material: 0,
        }],
        device,
    );

    let layout = material_layout(device);
    let white = Texture::from_pixel(device, queue, [255; 4], "triangle material");
    let materials = vec![Material::new(device, "triangle material", white, &layout)];

    Model { meshes, materials }
}
