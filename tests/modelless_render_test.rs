#[cfg(feature = "integration-tests")]
mod common;

/// The frame driver runs from the first redraw on, long before (or without)
/// any asset arriving. A full two-pass frame over a scene with no model must
/// go through cleanly.
#[test]
#[cfg(feature = "integration-tests")]
fn should_render_a_modelless_scene() {
    use std::time::Duration;

    use crate::common::test_utils::{gpu_device, test_surface_config, test_surface_texture};
    use prism::{composer::Composer, scene::Scene};

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (device, queue) = runtime.block_on(gpu_device());

    let config = test_surface_config(800, 600);
    let mut scene = Scene::new(&device, &queue);
    let mut composer = Composer::new(&device, &config);

    let surface = test_surface_texture(&device, &config);
    let surface_view = surface.create_view(&wgpu::TextureViewDescriptor::default());

    // A few frames, exactly as the frame driver advances them.
    for _ in 0..3 {
        scene.update(&queue);
        composer.prepare(&queue);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Render Encoder"),
        });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
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
            // No model attached: the pass only clears.
        }
        composer.compose(&mut encoder, &surface_view);
        queue.submit(std::iter::once(encoder.finish()));
    }

    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .expect("queue did not drain");

    assert!(scene.model.is_none());
}

/// Composer buffers follow a resize, matching what the surface and camera
/// are reconfigured to.
#[test]
#[cfg(feature = "integration-tests")]
fn should_resize_composer_buffers_with_the_surface() {
    use crate::common::test_utils::{gpu_device, test_surface_config};
    use prism::composer::Composer;

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (device, _queue) = runtime.block_on(gpu_device());

    let config = test_surface_config(800, 600);
    let mut composer = Composer::new(&device, &config);
    assert_eq!((composer.target.width, composer.target.height), (800, 600));

    composer.resize(&device, 1920, 1080);
    assert_eq!((composer.target.width, composer.target.height), (1920, 1080));

    // Degenerate sizes are ignored rather than creating zero-sized targets.
    composer.resize(&device, 0, 1080);
    assert_eq!((composer.target.width, composer.target.height), (1920, 1080));
}
