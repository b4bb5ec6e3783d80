//! Input state machines and the raw input boundary.

pub mod button;
pub mod directional;
pub mod keys;
pub mod source;
pub mod thumbstick;

pub use button::{ButtonState, TimedAnalogButtonState, TimedButtonState};
pub use directional::DirectionalState;
pub use keys::{KeyCode, MouseButton, NamedKey};
pub use source::{
    GamepadButtons, GamepadSnapshot, InputSource, JoystickSnapshot, KeyEvent, KeyEventKind,
    MouseSnapshot, PlayerIndex, QueuedInput,
};
pub use thumbstick::{normalize_stick, ThumbstickState};
