//! A component framework for small real-time games.
//!
//! A [`Core`] owns an ordered list of [`Component`]s and a registry of
//! type-keyed services they publish and consume. Each frame it applies the
//! loads and unloads requested during the previous frame, updates every
//! enabled component in order, then runs the draw hooks. Input devices, an
//! on-screen debugging bag and a persistent worker pool ship as built-in
//! components. Rendering and the platform window stay outside of the crate
//! behind [`RenderHooks`], [`TextRenderer`] and [`InputSource`], so the whole
//! framework runs headless in tests.

pub mod app;
pub mod components;
pub mod core;
pub mod error;
pub mod game;
pub mod input;
pub mod render;
pub mod settings;
pub mod tools;

pub use crate::core::{
    Bootstrap, Component, ComponentId, Core, FrameContext, Injection, Looping, Registration,
    RunMode, ServiceDependency, ServiceRegistry,
};
pub use components::{
    DebuggingBagService, GamepadsService, JoystickService, KeyboardService, MouseService,
    PersistentThreadPool,
};
pub use error::FrameworkError;
pub use game::{GameContext, GameSettings};
pub use input::{ButtonState, InputSource, KeyCode, MouseButton, NamedKey, QueuedInput};
pub use render::{Color, NullRenderHooks, RenderHooks, TextRenderer};
pub use settings::{EngineSettings, ScreenMode};
