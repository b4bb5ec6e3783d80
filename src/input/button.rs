use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Digital trigger threshold, the XInput trigger dead value scaled to `[0, 1]`.
pub const TRIGGER_THRESHOLD: f32 = 30.0 / 255.0;

/// Four-state edge detector shared by every digital input.
///
/// `Pressed` and `Released` only ever last a single tick; `Up` and `Down` are
/// the resting states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ButtonState {
    #[default]
    Up,
    Pressed,
    Released,
    Down,
}

impl ButtonState {
    /// Advances the machine by one tick given the current raw level.
    pub fn next_state(self, pressed: bool) -> Self {
        match (self, pressed) {
            (Self::Up, false) => Self::Up,
            (Self::Up, true) => Self::Pressed,
            (Self::Pressed, false) => Self::Released,
            (Self::Pressed, true) => Self::Down,
            (Self::Released, false) => Self::Up,
            (Self::Released, true) => Self::Pressed,
            (Self::Down, false) => Self::Released,
            (Self::Down, true) => Self::Down,
        }
    }

    /// True for `Pressed` and `Down`.
    pub fn is_down(self) -> bool {
        matches!(self, Self::Pressed | Self::Down)
    }

    /// True for `Released` and `Up`.
    pub fn is_up(self) -> bool {
        !self.is_down()
    }
}

/// Button state plus how long the raw signal has been held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimedButtonState {
    pub state: ButtonState,
    pub held: Duration,
}

impl TimedButtonState {
    pub fn next_state(self, down: bool, elapsed: Duration) -> Self {
        Self {
            state: self.state.next_state(down),
            held: if down { self.held + elapsed } else { Duration::ZERO },
        }
    }
}

/// Analog input (a trigger) with a thresholded digital view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimedAnalogButtonState {
    pub value: f32,
    pub state: ButtonState,
    pub held: Duration,
}

impl TimedAnalogButtonState {
    pub fn next_state(self, value: f32, elapsed: Duration) -> Self {
        let down = value > TRIGGER_THRESHOLD;
        Self {
            value,
            state: self.state.next_state(down),
            held: if down { self.held + elapsed } else { Duration::ZERO },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(levels: &[bool]) -> Vec<ButtonState> {
        let mut state = ButtonState::Up;
        levels
            .iter()
            .map(|&level| {
                state = state.next_state(level);
                state
            })
            .collect()
    }

    #[test]
    fn transition_table() {
        use ButtonState::*;
        let cases = [
            (Up, false, Up),
            (Up, true, Pressed),
            (Pressed, false, Released),
            (Pressed, true, Down),
            (Released, false, Up),
            (Released, true, Pressed),
            (Down, false, Released),
            (Down, true, Down),
        ];
        for (previous, raw, expected) in cases {
            assert_eq!(previous.next_state(raw), expected, "{previous:?} + {raw}");
        }
    }

    #[test]
    fn edges_are_exactly_one_tick_wide() {
        let levels = [
            false, true, true, true, false, false, true, false, true, true, false, true,
        ];
        let states = run(&levels);
        let mut previous_level = false;
        let mut previous_state = ButtonState::Up;
        for (&level, &state) in levels.iter().zip(&states) {
            if state == ButtonState::Pressed {
                assert!(level && !previous_level);
            }
            if state == ButtonState::Released {
                assert!(!level && previous_level);
            }
            if matches!(state, ButtonState::Pressed | ButtonState::Released) {
                assert_ne!(state, previous_state);
            }
            previous_level = level;
            previous_state = state;
        }
    }

    #[test]
    fn held_duration_accumulates_without_drift() {
        let tick = Duration::from_micros(16_667);
        let mut button = TimedButtonState::default();
        for _ in 0..600 {
            button = button.next_state(true, tick);
        }
        assert_eq!(button.held, tick * 600);
        assert_eq!(button.state, ButtonState::Down);

        button = button.next_state(false, tick);
        assert_eq!(button.held, Duration::ZERO);
        assert_eq!(button.state, ButtonState::Released);
    }

    #[test]
    fn analog_button_thresholds_and_keeps_value() {
        let tick = Duration::from_millis(10);
        let trigger = TimedAnalogButtonState::default().next_state(0.05, tick);
        assert_eq!(trigger.state, ButtonState::Up);
        assert_eq!(trigger.value, 0.05);

        let trigger = trigger.next_state(0.8, tick);
        assert_eq!(trigger.state, ButtonState::Pressed);
        assert_eq!(trigger.held, tick);
        assert_eq!(trigger.value, 0.8);

        let trigger = trigger.next_state(0.0, tick);
        assert_eq!(trigger.state, ButtonState::Released);
        assert_eq!(trigger.held, Duration::ZERO);
    }
}
