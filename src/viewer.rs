//! Application event loop and frame driver.
//!
//! The viewer owns one window, one GPU context and one scene. After startup
//! it kicks off the asset sequence (environment first, then the model) on an
//! async task and keeps rendering continuously; the frame driver never waits
//! for the loads and tolerates a missing model for the whole run.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and GPU context and starts the asset task
//! 2. finished assets arrive as [`ViewerEvent`]s through the event-loop proxy
//! 3. every `RedrawRequested` advances the pointer smoothing, the model
//!    rotation and the colour-split angle, then renders the two-pass chain

use std::{fmt::Debug, iter, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    composer::Composer,
    context::{Context, capped_surface_size},
    data_structures::model::DrawModel,
    environment::{self, EnvironmentMap},
    resources,
    scene::{ModelNode, Scene},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Equirectangular HDR radiance image, resolved below `assets/`.
pub const ENVIRONMENT_FILE: &str = "pond_bridge_night_2k.hdr";
/// glTF model with sibling buffer and texture files, resolved below `assets/`.
pub const MODEL_FILE: &str = "DamagedHelmet.gltf";

/// Results of the asset task, delivered to the event loop by proxy.
pub enum ViewerEvent {
    /// GPU context and scene are ready (async init on wasm).
    Ready(ViewerState),
    EnvironmentReady(EnvironmentMap),
    ModelReady(ModelNode),
}

impl Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Ready"),
            Self::EnvironmentReady(_) => f.write_str("EnvironmentReady"),
            Self::ModelReady(_) => f.write_str("ModelReady"),
        }
    }
}

/// Application state bundle: GPU context, scene state, and surface status.
pub struct ViewerState {
    ctx: Context,
    scene: Scene,
    composer: Composer,
    is_surface_configured: bool,
}

impl ViewerState {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let scene = Scene::new(&ctx.device, &ctx.queue);
        let composer = Composer::new(&ctx.device, &ctx.config);
        Ok(Self {
            ctx,
            scene,
            composer,
            is_surface_configured: false,
        })
    }

    /// Keep surface, projection and composer buffers mutually consistent; a
    /// missed resize on any one of them shows up as distortion or clipping.
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            let (width, height) =
                capped_surface_size(width, height, self.ctx.window.scale_factor());
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.composer.resize(&self.ctx.device, width, height);
        }
    }

    /// One frame: advance interaction and effect state, render the scene pass
    /// into the offscreen target, then composite onto the surface.
    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // Continuous redraw: schedule the next frame before drawing this one.
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        self.scene.update(&self.ctx.queue);
        self.composer.prepare(&self.ctx.queue);
        self.ctx
            .camera
            .uniform
            .update_view_proj(&self.ctx.camera.camera, &self.ctx.projection);
        self.ctx.queue.write_buffer(
            &self.ctx.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.ctx.camera.uniform]),
        );

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Scene Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &self.composer.target.color_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.composer.target.depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

            if let Some(node) = &self.scene.model {
                render_pass.set_pipeline(&self.ctx.model_pipeline);
                render_pass.set_vertex_buffer(1, node.instance_buffer.slice(..));
                render_pass.draw_model_instanced(
                    &node.model,
                    0..1,
                    &self.ctx.camera.bind_group,
                    &self.scene.lights.bind_group,
                    &self.scene.environment.bind_group,
                );
            }
        }
        self.composer.compose(&mut encoder, &view);

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    state: Option<ViewerState>,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>) -> Self {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().unwrap();
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
        }
    }

    /// Start the asset sequence on an async task. The frame driver keeps
    /// running independently while the loads are outstanding.
    fn spawn_asset_load(&self, ctx: &Context) {
        // The clones leverage the internal Arcs of Device and Queue and thus only clone the ref
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();
        let proxy = self.proxy.clone();
        let task = load_assets(device, queue, proxy);

        // The task runs detached; its results arrive as user events.
        #[cfg(not(target_arch = "wasm32"))]
        let _ = self.async_runtime.spawn(task);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Sequential load: the environment resolves (success or failure) before the
/// model is fetched, so the model never appears before its lighting.
async fn load_assets(device: wgpu::Device, queue: wgpu::Queue, proxy: EventLoopProxy<ViewerEvent>) {
    match environment::load_environment(&device, &queue, ENVIRONMENT_FILE).await {
        Ok(env) => {
            log::info!("environment loaded successfully");
            if proxy.send_event(ViewerEvent::EnvironmentReady(env)).is_err() {
                return;
            }
        }
        // Recovered locally: the fallback lights stay attached and the model
        // is loaded anyway.
        Err(e) => log::error!("environment loading error: {e}"),
    }

    match resources::load_model_gltf(MODEL_FILE, &device, &queue).await {
        Ok(model) => {
            log::info!("model loaded successfully");
            let node = ModelNode::new(&device, model);
            let _ = proxy.send_event(ViewerEvent::ModelReady(node));
        }
        // Not recovered: the scene stays modelless for the rest of the run.
        Err(e) => log::error!("model loading error: {e}"),
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let state = match self.async_runtime.block_on(ViewerState::new(window)) {
                Ok(state) => state,
                Err(e) => panic!("App initialization failed. Cannot create the main context: {e}"),
            };
            self.spawn_asset_load(&state.ctx);
            state.ctx.window.request_redraw();
            self.state = Some(state);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match ViewerState::new(window).await {
                    Ok(state) => assert!(proxy.send_event(ViewerEvent::Ready(state)).is_ok()),
                    Err(e) => {
                        log::error!("App initialization failed. Cannot create the main context: {e}")
                    }
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Ready(mut state) => {
                // This is the message from our wasm `spawn_local`

                // Important: Trigger a resize and redraw now that we are initialized
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                self.spawn_asset_load(&state.ctx);
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
            ViewerEvent::EnvironmentReady(environment) => {
                if let Some(state) = &mut self.state {
                    state.scene.install_environment(environment);
                    log::info!("environment lighting installed");
                }
            }
            ViewerEvent::ModelReady(node) => {
                if let Some(state) = &mut self.state {
                    state.scene.attach_model(node);
                    log::info!("model attached to scene");
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                let size = state.ctx.window.inner_size();
                state
                    .scene
                    .pointer
                    .set_target(position.x, position.y, size.width, size.height);
            }
            WindowEvent::RedrawRequested => match state.render() {
                Ok(_) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                }
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            },
            _ => {}
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop);

    event_loop.run_app(&mut app)?;

    Ok(())
}
