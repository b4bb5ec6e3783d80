//! Built-in components: input devices, on-screen diagnostics and the worker pool.

pub mod debugging_bag;
pub mod gamepads;
pub mod joystick;
pub mod keyboard;
pub mod mouse;
pub mod thread_pool;

pub use debugging_bag::{DebuggingBag, DebuggingBagService};
pub use gamepads::{GamepadState, Gamepads, GamepadsService, VibrationMotor};
pub use joystick::{Joystick, JoystickDirection, JoystickService};
pub use keyboard::{Keyboard, KeyboardService};
pub use mouse::{Mouse, MouseService};
pub use thread_pool::{PersistentThreadPool, ThreadPool, Worker};

use crate::core::{Bootstrap, RunMode};

/// Adds every built-in component to `bootstrap`.
pub fn bootstrap(bootstrap: Bootstrap) -> Bootstrap {
    bootstrap
        .auto_load::<DebuggingBag>(RunMode::Always)
        .auto_load::<Keyboard>(RunMode::Always)
        .auto_load::<Mouse>(RunMode::Always)
        .auto_load::<Joystick>(RunMode::Always)
        .auto_load::<Gamepads>(RunMode::Always)
        .auto_load::<ThreadPool>(RunMode::Always)
}
