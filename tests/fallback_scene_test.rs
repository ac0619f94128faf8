#[cfg(feature = "integration-tests")]
mod common;

/// The environment-failure path: the scene never receives an environment
/// map, keeps its fallback lights, and must still accept and render the
/// model once that load succeeds.
#[test]
#[cfg(feature = "integration-tests")]
fn should_attach_the_model_after_an_environment_failure() {
    use std::time::Duration;

    use cgmath::Deg;
    use prism::{
        camera::{Camera, CameraUniform, Projection},
        composer::Composer,
        data_structures::model::DrawModel,
        pipelines::model::mk_model_pipeline,
        scene::{ModelNode, Scene},
    };
    use wgpu::util::DeviceExt;

    use crate::common::test_utils::{
        gpu_device, test_surface_config, test_surface_texture, triangle_model,
    };

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (device, queue) = runtime.block_on(gpu_device());

    let config = test_surface_config(800, 600);
    let mut scene = Scene::new(&device, &queue);
    let mut composer = Composer::new(&device, &config);

    // No environment ever installed; the fallback lights carry the scene.
    assert!(scene.model.is_none());
    assert_eq!(scene.lights.uniform.ambient, 0.5);

    let node = ModelNode::new(&device, triangle_model(&device, &queue));
    scene.attach_model(node);
    assert!(scene.model.is_some());

    // A second arrival would be a loader bug; the scene keeps the first.
    let second = ModelNode::new(&device, triangle_model(&device, &queue));
    scene.attach_model(second);
    assert!(scene.model.is_some());
    assert_eq!(scene.lights.uniform.ambient, 0.5);

    // Camera resources as the context builds them.
    let camera = Camera::new((0.0, 0.0, 6.0), Deg(-90.0), Deg(0.0));
    let projection = Projection::new(config.width, config.height, Deg(25.0), 0.1, 1000.0);
    let mut camera_uniform = CameraUniform::new();
    camera_uniform.update_view_proj(&camera, &projection);
    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Camera Buffer"),
        contents: bytemuck::cast_slice(&[camera_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let camera_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("camera_bind_group_layout"),
        });
    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &camera_bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: camera_buffer.as_entire_binding(),
        }],
        label: Some("camera_bind_group"),
    });
    let pipeline = mk_model_pipeline(
        &device,
        wgpu::TextureFormat::Rgba16Float,
        &camera_bind_group_layout,
    );

    let surface = test_surface_texture(&device, &config);
    let surface_view = surface.create_view(&wgpu::TextureViewDescriptor::default());

    scene.update(&queue);
    composer.prepare(&queue);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Test Render Encoder"),
    });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &composer.target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &composer.target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let node = scene.model.as_ref().unwrap();
        pass.set_pipeline(&pipeline);
        pass.set_vertex_buffer(1, node.instance_buffer.slice(..));
        pass.draw_model_instanced(
            &node.model,
            0..1,
            &camera_bind_group,
            &scene.lights.bind_group,
            &scene.environment.bind_group,
        );
    }
    composer.compose(&mut encoder, &surface_view);
    queue.submit(std::iter::once(encoder.finish()));

    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .expect("queue did not drain");
}
