use std::time::Duration;

use glam::Vec2;

use super::button::TimedButtonState;

/// Four digital directions (a D-pad) folded into a 2D direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirectionalState {
    pub direction: Vec2,
    pub movement: Vec2,
    pub up: TimedButtonState,
    pub down: TimedButtonState,
    pub left: TimedButtonState,
    pub right: TimedButtonState,
}

impl DirectionalState {
    /// Recomputes the direction from the four levels.
    ///
    /// Opposing directions held together cancel to zero on that axis.
    pub fn next_state(
        self,
        up: bool,
        down: bool,
        left: bool,
        right: bool,
        elapsed: Duration,
    ) -> Self {
        let direction = Vec2::new(axis(right, left), axis(up, down));
        Self {
            direction,
            movement: direction - self.direction,
            up: self.up.next_state(up, elapsed),
            down: self.down.next_state(down, elapsed),
            left: self.left.next_state(left, elapsed),
            right: self.right.next_state(right, elapsed),
        }
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}
