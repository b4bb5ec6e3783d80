use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Fixed update step used when no frequency is configured.
pub const DEFAULT_UPDATE_STEP: Duration = Duration::from_nanos(16_666_667);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenMode {
    pub width: u32,
    pub height: u32,
    /// Color depth in bits per pixel.
    pub format: u32,
}

impl Default for ScreenMode {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: 32,
        }
    }
}

/// Start-up options for the core and its host window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub multi_threading: bool,
    pub fullscreen: bool,
    pub vsync: bool,
    /// MSAA sample count, zero for none.
    pub multisample: u32,
    pub screen_mode: ScreenMode,
    pub startup_scene: String,
    pub startup_camera_position: Vec3,
    pub startup_camera_look_at: Vec3,
    /// Set when the game was launched from the editor.
    pub preview_mode: bool,
    /// Seconds per fixed update. Zero or negative selects [`DEFAULT_UPDATE_STEP`].
    pub update_frequency: f32,
    pub use_glow: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            multi_threading: false,
            fullscreen: false,
            vsync: false,
            multisample: 0,
            screen_mode: ScreenMode::default(),
            startup_scene: String::new(),
            startup_camera_position: Vec3::ZERO,
            startup_camera_look_at: Vec3::ZERO,
            preview_mode: false,
            update_frequency: 0.0,
            use_glow: false,
        }
    }
}

impl EngineSettings {
    pub fn update_step(&self) -> Duration {
        if self.update_frequency.is_finite() && self.update_frequency > 0.0 {
            Duration::from_secs_f32(self.update_frequency)
        } else {
            DEFAULT_UPDATE_STEP
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_frequency_uses_sixty_hertz() {
        let settings = EngineSettings::default();
        assert_eq!(settings.update_step(), DEFAULT_UPDATE_STEP);
        let step = settings.update_step().as_secs_f64();
        assert!((step - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn configured_frequency_is_used() {
        let settings = EngineSettings {
            update_frequency: 0.01,
            ..EngineSettings::default()
        };
        assert_eq!(settings.update_step(), Duration::from_millis(10));
    }
}
