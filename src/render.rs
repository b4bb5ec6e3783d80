//! Boundary between the frame loop and whatever draws the frame.

use serde::{Deserialize, Serialize};

/// Linear RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Called by the core around the component draw pass.
pub trait RenderHooks {
    fn begin_frame(&mut self) {}

    fn end_frame(&mut self) {}

    /// Releases device resources. Called once when the core is disposed.
    fn release(&mut self) {}
}

/// Hooks that draw nothing, used when no graphics device exists.
#[derive(Debug, Default)]
pub struct NullRenderHooks;

impl RenderHooks for NullRenderHooks {}

/// Screen-space text output shared as a service.
pub trait TextRenderer: Send + Sync {
    fn begin_text(&self) {}

    fn draw_text(&self, text: &str, x: i32, y: i32, color: Color);

    fn end_text(&self) {}
}
