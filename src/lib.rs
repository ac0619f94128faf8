//! prism
//!
//! A single-scene model viewer for native and WASM: one glTF model lit by a
//! prefiltered HDR environment (with static fallback lights), rotated by the
//! smoothed pointer position and composited through a colour-split post pass.
//!
//! High-level modules
//! - `camera`: camera types and uniforms for view/projection
//! - `composer`: offscreen target and the colour-split pass chain
//! - `context`: central GPU and window context that owns device/queue/pipeline
//! - `data_structures`: model, texture and instance data
//! - `environment`: HDR decode and irradiance prefilter
//! - `interaction`: pointer smoothing and rotation mapping
//! - `lights`: static fallback lighting
//! - `pipelines`: render pipeline definitions and shaders
//! - `resources`: helpers to load the model and textures from files
//! - `scene`: scene state owned by the event loop
//! - `viewer`: application event loop and frame driver
//!

pub mod camera;
pub mod composer;
pub mod context;
pub mod data_structures;
pub mod environment;
pub mod interaction;
pub mod lights;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use viewer::run;
pub use winit::dpi::PhysicalPosition;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    if let Err(e) = viewer::run() {
        log::error!("viewer exited with error: {e}");
    }
}
