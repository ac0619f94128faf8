//! Pointer-driven interaction state.
//!
//! Every pointer move writes a normalized target position; every frame the
//! smoothed position eases toward it and is mapped onto the model rotation.

use cgmath::{Rad, Vector2, Zero};

/// Fraction of the remaining distance covered per frame.
pub const SMOOTHING: f32 = 0.05;

/// Scales the smoothed pointer excursion down to a subtle rotation range.
pub const ROTATION_SCALE: f32 = 0.12;

#[derive(Clone, Debug)]
pub struct PointerState {
    pub target: Vector2<f32>,
    pub current: Vector2<f32>,
}

impl PointerState {
    pub fn new() -> Self {
        Self {
            target: Vector2::zero(),
            current: Vector2::zero(),
        }
    }

    /// Record a pointer position in pixel coordinates (origin top-left).
    ///
    /// The position is normalized to roughly [-0.5, 0.5] per axis and scaled
    /// by pi, so a full sweep across the window maps to half a turn before
    /// [`ROTATION_SCALE`] is applied.
    pub fn set_target(&mut self, x: f64, y: f64, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.target.x = (x as f32 / width as f32 - 0.5) * std::f32::consts::PI;
        self.target.y = (y as f32 / height as f32 - 0.5) * std::f32::consts::PI;
    }

    /// Move the smoothed position a fixed fraction toward the target.
    ///
    /// This is an exponential smoothing filter: the distance to a held target
    /// shrinks by `1 - SMOOTHING` each frame and never overshoots.
    pub fn advance(&mut self) {
        self.current += (self.target - self.current) * SMOOTHING;
    }

    /// Map the smoothed position onto model rotation (yaw, pitch).
    pub fn model_rotation(&self) -> (Rad<f32>, Rad<f32>) {
        (
            Rad(self.current.x * ROTATION_SCALE),
            Rad(self.current.y * ROTATION_SCALE),
        )
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}
