use std::time::Duration;

use glam::Vec2;

use super::button::TimedButtonState;
use crate::tools::math::saturate;

/// Stick deflection past which a direction counts as pressed.
pub const PRESS_THRESHOLD: f32 = 0.5;
pub const LEFT_THUMB_DEADZONE: i16 = 7849;
pub const RIGHT_THUMB_DEADZONE: i16 = 8689;

/// Analog stick position with a derived digital view of its four directions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThumbstickState {
    pub position: Vec2,
    pub movement: Vec2,
    pub clicked: TimedButtonState,
    pub up: TimedButtonState,
    pub down: TimedButtonState,
    pub left: TimedButtonState,
    pub right: TimedButtonState,
}

impl ThumbstickState {
    /// `position` is expected to be deadzone-normalized (see [`normalize_stick`]).
    pub fn next_state(self, position: Vec2, clicked: bool, elapsed: Duration) -> Self {
        let pressed = |axis: f32| saturate(f64::from(axis)) > f64::from(PRESS_THRESHOLD);
        Self {
            position,
            movement: position - self.position,
            clicked: self.clicked.next_state(clicked, elapsed),
            up: self.up.next_state(pressed(position.y), elapsed),
            down: self.down.next_state(pressed(-position.y), elapsed),
            left: self.left.next_state(pressed(-position.x), elapsed),
            right: self.right.next_state(pressed(position.x), elapsed),
        }
    }
}

/// Rescales a raw stick reading so the deadzone edge maps to 0 and full
/// deflection maps to 1, keeping the raw direction.
pub fn normalize_stick(raw_x: i16, raw_y: i16, deadzone: i16) -> Vec2 {
    let value = Vec2::new(f32::from(raw_x), f32::from(raw_y));
    let magnitude = value.length();
    if magnitude == 0.0 {
        return Vec2::ZERO;
    }
    let deadzone = f32::from(deadzone);
    let range = f32::from(i16::MAX) - deadzone;
    let scaled = ((magnitude - deadzone) / range).clamp(0.0, 1.0);
    value / magnitude * scaled
}
