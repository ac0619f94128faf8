//! Scene state: the optional model, its lights, and the pointer state.

use cgmath::{Quaternion, Rad, Rotation3};
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{instance::Instance, model::Model},
    environment::EnvironmentMap,
    interaction::PointerState,
    lights::{LightResources, LightUniform},
};

/// The loaded model together with its single instance and the GPU buffer the
/// instance transform is written to.
pub struct ModelNode {
    pub model: Model,
    pub instance: Instance,
    pub instance_buffer: wgpu::Buffer,
}

impl ModelNode {
    pub fn new(device: &wgpu::Device, model: Model) -> Self {
        let instance = Instance::new();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&[instance.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            model,
            instance,
            instance_buffer,
        }
    }

    /// Rotate around the vertical axis by `yaw`, then around the horizontal
    /// axis by `pitch` (pointer-x and pointer-y respectively).
    pub fn set_rotation(&mut self, yaw: Rad<f32>, pitch: Rad<f32>) {
        self.instance.rotation = Quaternion::from_angle_x(pitch) * Quaternion::from_angle_y(yaw);
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&[self.instance.to_raw()]),
        );
    }
}

/// Everything the frame driver reads and writes, owned by the application
/// type instead of living in globals.
pub struct Scene {
    /// Becomes `Some` exactly once, when the model asset finishes loading.
    pub model: Option<ModelNode>,
    /// Attached unconditionally at startup and never removed, even when an
    /// environment map arrives later.
    pub lights: LightResources,
    /// Placeholder until (or instead of) a loaded environment.
    pub environment: EnvironmentMap,
    pub pointer: PointerState,
}

impl Scene {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            model: None,
            lights: LightResources::new(device, LightUniform::fallback()),
            environment: EnvironmentMap::placeholder(device, queue),
            pointer: PointerState::new(),
        }
    }

    /// Swap the placeholder for the derived lighting texture.
    pub fn install_environment(&mut self, environment: EnvironmentMap) {
        self.environment = environment;
    }

    /// Attach the loaded model. The model is never reloaded or replaced
    /// during the run, a second attach is ignored.
    pub fn attach_model(&mut self, node: ModelNode) {
        if self.model.is_none() {
            self.model = Some(node);
        } else {
            log::warn!("model already attached, ignoring a second one");
        }
    }

    /// Per-frame state advance: ease the pointer, rotate the model if one is
    /// attached. Tolerates a missing model indefinitely.
    pub fn update(&mut self, queue: &wgpu::Queue) {
        self.pointer.advance();
        if let Some(node) = &mut self.model {
            let (yaw, pitch) = self.pointer.model_rotation();
            node.set_rotation(yaw, pitch);
            node.write_to_buffer(queue);
        }
    }
}
