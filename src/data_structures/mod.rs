//! Engine data structures: the model, its textures, and its instance transform.
//!
//! - `model` contains mesh and material definitions, GPU resources for the 3D model
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds the per-instance transformation data

pub mod instance;
pub mod model;
pub mod texture;
