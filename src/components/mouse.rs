use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use parking_lot::RwLock;

use crate::core::{Component, FrameContext, Injection, ServiceDependency, ServiceRegistry};
use crate::error::FrameworkError;
use crate::input::{InputSource, MouseSnapshot, TimedButtonState};

/// Mouse state for the current tick.
pub trait MouseService: Send + Sync {
    fn position(&self) -> Vec2;

    /// Warps the cursor. Takes effect in the input source immediately.
    fn set_position(&self, position: Vec2);

    /// Cursor movement since the previous tick.
    fn movement(&self) -> Vec2;

    fn left_button(&self) -> TimedButtonState;

    fn middle_button(&self) -> TimedButtonState;

    fn right_button(&self) -> TimedButtonState;

    /// Wheel notches scrolled since the previous tick.
    fn wheel(&self) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
struct MouseReading {
    position: Vec2,
    movement: Vec2,
    left: TimedButtonState,
    middle: TimedButtonState,
    right: TimedButtonState,
    wheel: i32,
}

#[derive(Default)]
pub struct MouseState {
    reading: RwLock<MouseReading>,
    source: RwLock<Option<Arc<dyn InputSource>>>,
}

impl MouseState {
    fn attach(&self, source: Arc<dyn InputSource>) {
        *self.source.write() = Some(source);
    }

    pub fn apply(&self, snapshot: MouseSnapshot, elapsed: Duration) {
        let mut reading = self.reading.write();
        reading.position = snapshot.position;
        reading.movement = snapshot.delta;
        reading.left = reading.left.next_state(snapshot.left, elapsed);
        reading.middle = reading.middle.next_state(snapshot.middle, elapsed);
        reading.right = reading.right.next_state(snapshot.right, elapsed);
        reading.wheel = snapshot.wheel;
    }
}

impl MouseService for MouseState {
    fn position(&self) -> Vec2 {
        self.reading.read().position
    }

    fn set_position(&self, position: Vec2) {
        if let Some(source) = self.source.read().as_ref() {
            source.set_mouse_position(position);
        }
        self.reading.write().position = position;
    }

    fn movement(&self) -> Vec2 {
        self.reading.read().movement
    }

    fn left_button(&self) -> TimedButtonState {
        self.reading.read().left
    }

    fn middle_button(&self) -> TimedButtonState {
        self.reading.read().middle
    }

    fn right_button(&self) -> TimedButtonState {
        self.reading.read().right
    }

    fn wheel(&self) -> i32 {
        self.reading.read().wheel
    }
}

#[derive(Default)]
pub struct Mouse {
    state: Arc<MouseState>,
    source: Option<Arc<dyn InputSource>>,
}

impl Component for Mouse {
    fn name(&self) -> &'static str {
        "Mouse"
    }

    fn register_services(&self, registry: &mut ServiceRegistry) {
        let service: Arc<dyn MouseService> = self.state.clone();
        registry.register(service);
    }

    fn dependencies(&self) -> Vec<ServiceDependency> {
        vec![ServiceDependency::required::<dyn InputSource>()]
    }

    fn inject(&mut self, services: &mut Injection<'_>) -> Result<(), FrameworkError> {
        let source = services.require::<dyn InputSource>()?;
        self.state.attach(Arc::clone(&source));
        self.source = Some(source);
        Ok(())
    }

    fn update(&mut self, _context: &mut FrameContext<'_>, elapsed: Duration) {
        if let Some(source) = &self.source {
            self.state.apply(source.poll_mouse(), elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Bootstrap, Core, RunMode};
    use crate::input::{ButtonState, MouseButton, QueuedInput};
    use crate::settings::EngineSettings;

    const TICK: Duration = Duration::from_millis(16);

    fn mouse_core() -> (Core, Arc<QueuedInput>, Arc<dyn MouseService>) {
        let input = Arc::new(QueuedInput::new());
        let mut core = Core::new(EngineSettings::default());
        let source: Arc<dyn InputSource> = input.clone();
        core.register_service(source);
        core.initialize(Bootstrap::new().auto_load::<Mouse>(RunMode::Always))
            .unwrap();
        let mouse = core.get_service::<dyn MouseService>().unwrap();
        (core, input, mouse)
    }

    #[test]
    fn tracks_position_movement_and_wheel() {
        let (mut core, input, mouse) = mouse_core();
        input.move_cursor(Vec2::new(40.0, 30.0));
        input.scroll(-1);
        core.update(TICK).unwrap();
        assert_eq!(mouse.position(), Vec2::new(40.0, 30.0));
        assert_eq!(mouse.movement(), Vec2::new(40.0, 30.0));
        assert_eq!(mouse.wheel(), -1);

        core.update(TICK).unwrap();
        assert_eq!(mouse.movement(), Vec2::ZERO);
        assert_eq!(mouse.wheel(), 0);
    }

    #[test]
    fn buttons_run_through_the_state_machine() {
        let (mut core, input, mouse) = mouse_core();
        input.set_mouse_button(MouseButton::LEFT, true);
        core.update(TICK).unwrap();
        assert_eq!(mouse.left_button().state, ButtonState::Pressed);
        core.update(TICK).unwrap();
        assert_eq!(mouse.left_button().state, ButtonState::Down);
        assert_eq!(mouse.left_button().held, TICK * 2);
        assert_eq!(mouse.right_button().state, ButtonState::Up);

        input.set_mouse_button(MouseButton::LEFT, false);
        core.update(TICK).unwrap();
        assert_eq!(mouse.left_button().state, ButtonState::Released);
    }

    #[test]
    fn set_position_reaches_the_source() {
        let (mut core, input, mouse) = mouse_core();
        mouse.set_position(Vec2::new(400.0, 300.0));
        assert_eq!(mouse.position(), Vec2::new(400.0, 300.0));
        core.update(TICK).unwrap();
        assert_eq!(input.poll_mouse().position, Vec2::new(400.0, 300.0));
    }
}
